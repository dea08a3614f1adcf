use nearby_core::TestLocation;
use tokio::sync::{mpsc, oneshot};

use crate::error::SchedulerError;
use crate::event::{Reply, SchedulerEvent};
use crate::ports::SampleSender;
use crate::settings::SchedulerSettings;
use crate::state::SchedulerStatus;

/// Cloneable front door to a running [`InvocationScheduler`](crate::InvocationScheduler).
///
/// Every call is queued behind earlier events, so a `status()` issued after a
/// sample was sent observes that sample's effect on the state.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<SchedulerEvent>,
}

impl SchedulerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        Self { tx }
    }

    /// Replace the scheduler settings.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfiguration`] if a value is rejected; the
    /// previous settings stay in force and the error is also reported to the sink.
    pub async fn configure(&self, settings: SchedulerSettings) -> Result<(), SchedulerError> {
        self.request(|reply| SchedulerEvent::Configure { settings, reply })
            .await?
    }

    /// Run one sample → search → deliver cycle, then disable.
    ///
    /// With a test location (passed here or configured) the sample is synthesized
    /// and gated immediately instead of arming the location source.
    ///
    /// Ignored while a one-shot search is already in flight. Starting a one-shot
    /// session while scheduled sampling runs replaces it, and results of
    /// scheduled searches still in flight are not delivered.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfiguration`] if the search provider is not ready.
    pub async fn enable_once(
        &self,
        test_location: Option<TestLocation>,
    ) -> Result<(), SchedulerError> {
        self.request(|reply| SchedulerEvent::EnableOnce {
            test_location,
            reply,
        })
        .await?
    }

    /// Turn periodic sampling on or off. Turning it off suppresses delivery of
    /// any search still in flight; failures are still reported. Turning it off
    /// while a one-shot session runs does nothing.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfiguration`] if enabling and the search
    /// provider is not ready.
    pub async fn enable_scheduled(&self, on: bool) -> Result<(), SchedulerError> {
        self.request(|reply| SchedulerEvent::EnableScheduled { on, reply })
            .await?
    }

    /// Forget the last accepted location so the next sample always passes the gate.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Closed`] if the scheduler has stopped.
    pub async fn reset_prior_location(&self) -> Result<(), SchedulerError> {
        self.request(|reply| SchedulerEvent::ResetPriorLocation { reply })
            .await
    }

    /// # Errors
    ///
    /// [`SchedulerError::Closed`] if the scheduler has stopped.
    pub async fn status(&self) -> Result<SchedulerStatus, SchedulerError> {
        self.request(|reply| SchedulerEvent::Status { reply }).await
    }

    /// Disarm the location source and stop the scheduler task.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Closed`] if the scheduler had already stopped.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.request(|reply| SchedulerEvent::Shutdown { reply })
            .await
    }

    /// A sender for location sources that are driven outside of `arm`.
    #[must_use]
    pub fn sample_sender(&self) -> SampleSender {
        SampleSender::new(self.tx.clone())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> SchedulerEvent,
    ) -> Result<T, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| SchedulerError::Closed)?;
        rx.await.map_err(|_| SchedulerError::Closed)
    }
}
