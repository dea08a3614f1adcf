//! The invocation scheduler task.
//!
//! One task owns [`SchedulerState`] and consumes a single event channel fed by
//! the [`SchedulerHandle`], location sources (through [`SampleSender`]) and the
//! search tasks it spawns. Every state transition happens here, so a disable
//! racing an in-flight result is decided by channel order alone.

use std::sync::Arc;
use std::time::Duration;

use nearby_core::{
    map_response, ConfigurationError, LocationSample, RawSearchResponse, SearchError,
    SearchProvider, SearchRequest, TestLocation,
};
use tokio::sync::mpsc;

use crate::error::SchedulerError;
use crate::event::SchedulerEvent;
use crate::handle::SchedulerHandle;
use crate::ports::{LocationSource, ResultSink, SampleSender};
use crate::settings::{ActiveSettings, SchedulerSettings};
use crate::state::{Mode, SchedulerState, SchedulerStatus};

pub struct InvocationScheduler {
    state: SchedulerState,
    settings: ActiveSettings,
    location: Arc<dyn LocationSource>,
    provider: Arc<dyn SearchProvider>,
    sink: Arc<dyn ResultSink>,
    events: mpsc::WeakUnboundedSender<SchedulerEvent>,
}

impl InvocationScheduler {
    /// Start a scheduler task with default settings, disabled.
    ///
    /// The task stops on [`SchedulerHandle::shutdown`] or once every handle and
    /// sample sender has been dropped. Must be called inside a tokio runtime.
    pub fn spawn(
        location: Arc<dyn LocationSource>,
        provider: Arc<dyn SearchProvider>,
        sink: Arc<dyn ResultSink>,
    ) -> SchedulerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            state: SchedulerState::default(),
            settings: ActiveSettings::default(),
            location,
            provider,
            sink,
            events: tx.downgrade(),
        };
        tokio::spawn(scheduler.run(rx));
        SchedulerHandle::new(tx)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SchedulerEvent>) {
        tracing::debug!("scheduler: started");
        while let Some(event) = rx.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        self.location.disarm();
        tracing::debug!("scheduler: stopped");
    }

    /// Apply one event. Returns `false` when the task should stop.
    fn handle(&mut self, event: SchedulerEvent) -> bool {
        match event {
            SchedulerEvent::Configure { settings, reply } => {
                let _ = reply.send(self.configure(&settings));
            }
            SchedulerEvent::EnableOnce {
                test_location,
                reply,
            } => {
                let _ = reply.send(self.enable_once(test_location));
            }
            SchedulerEvent::EnableScheduled { on, reply } => {
                let _ = reply.send(self.enable_scheduled(on));
            }
            SchedulerEvent::ResetPriorLocation { reply } => {
                self.state.prior_location = None;
                tracing::debug!("scheduler: prior location cleared");
                let _ = reply.send(());
            }
            SchedulerEvent::Status { reply } => {
                let _ = reply.send(self.status());
            }
            SchedulerEvent::Shutdown { reply } => {
                self.state.enabled = false;
                let _ = reply.send(());
                return false;
            }
            SchedulerEvent::SampleReceived(sample) => self.on_sample(sample),
            SchedulerEvent::SearchCompleted {
                request_id,
                session,
                outcome,
            } => self.on_search_completed(request_id, session, outcome),
        }
        true
    }

    fn configure(&mut self, settings: &SchedulerSettings) -> Result<(), SchedulerError> {
        let next = settings
            .validate()
            .map_err(|e| self.configuration_failed(e))?;

        let rearm = self.state.enabled
            && self.state.mode == Mode::Scheduled
            && self.settings.arm_request(false) != next.arm_request(false);
        self.settings = next;
        tracing::debug!(settings = ?self.settings, "scheduler: configured");

        if rearm {
            tracing::info!(
                interval_secs = self.settings.interval_secs,
                "scheduler: sampling parameters changed; re-arming location source"
            );
            self.location.disarm();
            self.arm(false);
        }
        Ok(())
    }

    fn enable_once(&mut self, test_location: Option<TestLocation>) -> Result<(), SchedulerError> {
        if self.state.one_shot_in_flight() {
            tracing::debug!("scheduler: one-shot search already in flight; enable_once ignored");
            return Ok(());
        }

        if let Some(location) = test_location.or(self.settings.test_location) {
            tracing::info!(
                latitude = location.latitude,
                longitude = location.longitude,
                "scheduler: one-shot with test location"
            );
            self.start_session(Mode::OneShot);
            self.on_sample(location.to_sample());
            return Ok(());
        }

        self.check_provider()?;
        self.start_session(Mode::OneShot);
        self.arm(true);
        tracing::info!("scheduler: one-shot armed");
        Ok(())
    }

    fn enable_scheduled(&mut self, on: bool) -> Result<(), SchedulerError> {
        if !on {
            if self.state.enabled && self.state.mode == Mode::OneShot {
                tracing::debug!("scheduler: one-shot session running; scheduled disable ignored");
                return Ok(());
            }
            if self.state.enabled {
                tracing::info!(
                    in_flight = self.state.in_flight,
                    "scheduler: disabled; in-flight results will be suppressed"
                );
            }
            self.state.mode = Mode::Scheduled;
            self.end_session();
            return Ok(());
        }

        self.check_provider()?;
        self.start_session(Mode::Scheduled);
        self.arm(false);
        tracing::info!(
            interval_secs = self.settings.interval_secs,
            duration_secs = self.settings.duration_secs,
            "scheduler: scheduled sampling enabled"
        );
        Ok(())
    }

    fn on_sample(&mut self, sample: LocationSample) {
        if !self.state.enabled {
            tracing::debug!("scheduler: sample received while disabled; ignoring");
            return;
        }
        if self.state.mode == Mode::OneShot && self.state.one_shot_request.is_some() {
            tracing::debug!("scheduler: one-shot search already in flight; ignoring sample");
            return;
        }

        let accepted = self
            .settings
            .policy
            .accept(&sample, self.state.prior_location.as_ref());
        if !accepted {
            if self.state.mode == Mode::OneShot {
                tracing::info!("scheduler: one-shot sample did not pass the movement gate");
                self.end_session();
            }
            return;
        }

        let request = SearchRequest::at(
            &sample,
            self.settings.radius_meters,
            self.settings.place_type,
        );
        self.state.prior_location = Some(sample);
        let request_id = self.dispatch_search(request);

        if self.state.mode == Mode::OneShot {
            self.state.one_shot_request = Some(request_id);
            self.location.disarm();
        }
    }

    fn on_search_completed(
        &mut self,
        request_id: u64,
        session: u64,
        outcome: Result<RawSearchResponse, SearchError>,
    ) {
        self.state.in_flight = self.state.in_flight.saturating_sub(1);
        self.state.searches_completed += 1;
        let current = self.state.enabled && session == self.state.session;

        match outcome {
            Ok(raw) if current => {
                let places = map_response(&raw);
                tracing::info!(
                    request_id,
                    count = places.len(),
                    "scheduler: delivering nearby places"
                );
                self.sink.deliver(places);
            }
            Ok(_) => {
                tracing::debug!(
                    request_id,
                    session,
                    "scheduler: session ended before result arrived; delivery suppressed"
                );
            }
            Err(err) => {
                tracing::warn!(request_id, error = %err, "scheduler: nearby search failed");
                self.sink.report_error(&err.to_string());
            }
        }

        if self.state.one_shot_request == Some(request_id) {
            self.end_session();
        }
    }

    /// Spawn the search on its own task; its outcome comes back as an event.
    fn dispatch_search(&mut self, request: SearchRequest) -> u64 {
        let request_id = self.state.take_request_id();
        self.state.in_flight += 1;

        tracing::debug!(
            request_id,
            latitude = request.latitude,
            longitude = request.longitude,
            radius_meters = request.radius_meters,
            place_type = request.place_type.map(|t| t.as_str()),
            "scheduler: issuing nearby search"
        );

        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        let timeout = self.settings.search_timeout;
        let session = self.state.session;

        tokio::spawn(async move {
            let search =
                tokio::spawn(async move { run_search(provider.as_ref(), &request, timeout).await });
            let outcome = match search.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(SearchError::Aborted(join_err.to_string())),
            };
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(SchedulerEvent::SearchCompleted {
                    request_id,
                    session,
                    outcome,
                });
            }
        });

        request_id
    }

    /// Re-enabling the mode already running keeps its in-flight searches
    /// deliverable; any other transition starts a fresh session.
    fn start_session(&mut self, mode: Mode) {
        let continuing = self.state.enabled && self.state.mode == mode;
        if self.state.enabled {
            self.location.disarm();
        }
        if !continuing {
            self.state.next_session();
        }
        self.state.mode = mode;
        self.state.enabled = true;
        self.state.one_shot_request = None;
    }

    fn end_session(&mut self) {
        if self.state.enabled {
            self.state.next_session();
        }
        self.state.enabled = false;
        self.state.one_shot_request = None;
        self.location.disarm();
    }

    fn arm(&self, one_shot: bool) {
        let Some(tx) = self.events.upgrade() else {
            return;
        };
        self.location
            .arm(&self.settings.arm_request(one_shot), SampleSender::new(tx));
    }

    fn check_provider(&self) -> Result<(), SchedulerError> {
        self.provider
            .validate()
            .map_err(|reason| self.configuration_failed(ConfigurationError::ProviderNotReady(reason)))
    }

    fn configuration_failed(&self, err: ConfigurationError) -> SchedulerError {
        tracing::warn!(error = %err, "scheduler: rejected configuration");
        self.sink.report_error(&err.to_string());
        SchedulerError::InvalidConfiguration(err)
    }

    fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            mode: self.state.mode,
            enabled: self.state.enabled,
            phase: self.state.phase(),
            prior_location: self.state.prior_location.clone(),
            in_flight: self.state.in_flight,
            searches_completed: self.state.searches_completed,
            interval_secs: self.settings.interval_secs,
            duration_secs: self.settings.duration_secs,
        }
    }
}

async fn run_search(
    provider: &dyn SearchProvider,
    request: &SearchRequest,
    timeout: Option<Duration>,
) -> Result<RawSearchResponse, SearchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.search(request))
            .await
            .unwrap_or(Err(SearchError::TimedOut(limit))),
        None => provider.search(request).await,
    }
}
