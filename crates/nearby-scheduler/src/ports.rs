//! Collaborators injected into the scheduler.
//!
//! The search side lives in `nearby-core` as [`SearchProvider`](nearby_core::SearchProvider)
//! so provider crates do not depend on the scheduler.

use nearby_core::{LocationSample, PlaceRecord};
use tokio::sync::mpsc;

use crate::event::SchedulerEvent;

/// Sampling parameters handed to a [`LocationSource`] when it is armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmRequest {
    /// Report a single sample, then stop.
    pub one_shot: bool,
    /// Seconds between sampling passes in periodic mode.
    pub interval_secs: u64,
    /// Upper bound on one sampling pass.
    pub duration_secs: u64,
    pub use_gps: bool,
    pub use_network: bool,
    /// A pass may stop early once a fix at least this good (0–100) is found.
    pub good_enough_accuracy: u8,
}

/// Produces location samples on its own timer or sensor thread.
///
/// Calls come from the scheduler task and must not block. `disarm` must be
/// idempotent; it is called whenever a session ends, armed or not.
pub trait LocationSource: Send + Sync {
    fn arm(&self, request: &ArmRequest, samples: SampleSender);
    fn disarm(&self);
}

/// Receives mapped results and failures.
///
/// Called on the scheduler task. Implementations that need another thread (a UI
/// loop, say) must hand the value off rather than block. Calling back into a
/// [`SampleSender`] or spawning work that uses a
/// [`SchedulerHandle`](crate::SchedulerHandle) is safe.
pub trait ResultSink: Send + Sync {
    /// Only called while the feature is enabled.
    fn deliver(&self, places: Vec<PlaceRecord>);
    /// Called for every configuration and search failure, enabled or not.
    fn report_error(&self, message: &str);
}

/// Where a location source pushes samples. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SampleSender {
    tx: mpsc::UnboundedSender<SchedulerEvent>,
}

impl SampleSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        Self { tx }
    }

    /// Queue a sample for gating. Returns `false` once the scheduler has stopped.
    pub fn send(&self, sample: LocationSample) -> bool {
        self.tx.send(SchedulerEvent::SampleReceived(sample)).is_ok()
    }

    /// Callback form used by sensor integrations.
    pub fn on_sample(
        &self,
        latitude: f64,
        longitude: f64,
        accuracy: f32,
        provider: &str,
        timestamp_millis: i64,
    ) -> bool {
        self.send(LocationSample::new(
            latitude,
            longitude,
            accuracy,
            provider,
            timestamp_millis,
        ))
    }
}
