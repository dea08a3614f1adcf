use nearby_core::{LocationSample, RawSearchResponse, SearchError, TestLocation};
use tokio::sync::oneshot;

use crate::error::SchedulerError;
use crate::settings::SchedulerSettings;
use crate::state::SchedulerStatus;

pub(crate) type Reply<T> = oneshot::Sender<T>;

/// Everything the scheduler task reacts to, in arrival order.
pub(crate) enum SchedulerEvent {
    Configure {
        settings: SchedulerSettings,
        reply: Reply<Result<(), SchedulerError>>,
    },
    EnableOnce {
        test_location: Option<TestLocation>,
        reply: Reply<Result<(), SchedulerError>>,
    },
    EnableScheduled {
        on: bool,
        reply: Reply<Result<(), SchedulerError>>,
    },
    ResetPriorLocation {
        reply: Reply<()>,
    },
    Status {
        reply: Reply<SchedulerStatus>,
    },
    Shutdown {
        reply: Reply<()>,
    },
    SampleReceived(LocationSample),
    SearchCompleted {
        request_id: u64,
        session: u64,
        outcome: Result<RawSearchResponse, SearchError>,
    },
}

impl std::fmt::Debug for SchedulerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerEvent::Configure { settings, .. } => {
                f.debug_struct("Configure").field("settings", settings).finish()
            }
            SchedulerEvent::EnableOnce { test_location, .. } => f
                .debug_struct("EnableOnce")
                .field("test_location", test_location)
                .finish(),
            SchedulerEvent::EnableScheduled { on, .. } => {
                f.debug_struct("EnableScheduled").field("on", on).finish()
            }
            SchedulerEvent::ResetPriorLocation { .. } => f.write_str("ResetPriorLocation"),
            SchedulerEvent::Status { .. } => f.write_str("Status"),
            SchedulerEvent::Shutdown { .. } => f.write_str("Shutdown"),
            SchedulerEvent::SampleReceived(sample) => {
                f.debug_tuple("SampleReceived").field(sample).finish()
            }
            SchedulerEvent::SearchCompleted {
                request_id,
                session,
                outcome,
            } => f
                .debug_struct("SearchCompleted")
                .field("request_id", request_id)
                .field("session", session)
                .field("ok", &outcome.is_ok())
                .finish(),
        }
    }
}
