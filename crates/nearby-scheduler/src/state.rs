use nearby_core::LocationSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One sample, at most one search, then disabled.
    OneShot,
    /// Sample on the location source's interval until disabled.
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disabled,
    /// Enabled and waiting for a sample.
    Armed,
    /// Enabled with at least one search outstanding.
    Invoking,
}

/// Session state owned by the scheduler task.
///
/// `prior_location` survives disabling; only an explicit reset clears it, so a
/// re-enabled session is gated against wherever the last search happened.
#[derive(Debug, Clone)]
pub(crate) struct SchedulerState {
    pub mode: Mode,
    pub enabled: bool,
    pub prior_location: Option<LocationSample>,
    pub in_flight: usize,
    /// The search that will end the current one-shot session.
    pub one_shot_request: Option<u64>,
    /// Bumped whenever a session starts or ends; results tagged with an older
    /// value are never delivered.
    pub session: u64,
    pub next_request_id: u64,
    pub searches_completed: u64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            mode: Mode::OneShot,
            enabled: false,
            prior_location: None,
            in_flight: 0,
            one_shot_request: None,
            session: 0,
            next_request_id: 1,
            searches_completed: 0,
        }
    }
}

impl SchedulerState {
    pub fn phase(&self) -> Phase {
        match (self.enabled, self.in_flight) {
            (false, _) => Phase::Disabled,
            (true, 0) => Phase::Armed,
            (true, _) => Phase::Invoking,
        }
    }

    pub fn one_shot_in_flight(&self) -> bool {
        self.enabled && self.mode == Mode::OneShot && self.one_shot_request.is_some()
    }

    pub fn next_session(&mut self) {
        self.session += 1;
    }

    pub fn take_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }
}

/// Point-in-time view of the scheduler, returned by
/// [`SchedulerHandle::status`](crate::SchedulerHandle::status).
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerStatus {
    pub mode: Mode,
    pub enabled: bool,
    pub phase: Phase,
    pub prior_location: Option<LocationSample>,
    pub in_flight: usize,
    pub searches_completed: u64,
    pub interval_secs: u64,
    pub duration_secs: u64,
}
