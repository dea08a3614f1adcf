//! Fake collaborators for scheduler integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nearby_core::{
    LocationSample, PlaceRecord, RawPlace, RawSearchResponse, SearchError, SearchProvider,
    SearchRequest,
};
use nearby_scheduler::{
    ArmRequest, InvocationScheduler, LocationSource, ResultSink, SampleSender, SchedulerHandle,
    SchedulerStatus,
};
use tokio::sync::{mpsc, Semaphore};

pub const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    Arm(ArmRequest),
    Disarm,
}

/// Records arm/disarm calls and keeps the last sender so tests can emit samples.
#[derive(Default)]
pub struct FakeLocationSource {
    calls: Mutex<Vec<SourceCall>>,
    sender: Mutex<Option<SampleSender>>,
}

impl FakeLocationSource {
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn arm_requests(&self) -> Vec<ArmRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SourceCall::Arm(r) => Some(r),
                SourceCall::Disarm => None,
            })
            .collect()
    }

    pub fn emit(&self, sample: LocationSample) {
        let sender = self.sender.lock().unwrap().clone();
        assert!(
            sender.expect("location source was never armed").send(sample),
            "scheduler stopped"
        );
    }
}

impl LocationSource for FakeLocationSource {
    fn arm(&self, request: &ArmRequest, samples: SampleSender) {
        self.calls
            .lock()
            .unwrap()
            .push(SourceCall::Arm(request.clone()));
        *self.sender.lock().unwrap() = Some(samples);
    }

    fn disarm(&self) {
        self.calls.lock().unwrap().push(SourceCall::Disarm);
    }
}

/// Returns scripted outcomes, optionally holding each search until released.
pub struct FakeSearchProvider {
    outcomes: Mutex<VecDeque<Result<RawSearchResponse, SearchError>>>,
    requests: Mutex<Vec<SearchRequest>>,
    gate: Option<Semaphore>,
    ready: Result<(), String>,
}

impl FakeSearchProvider {
    pub fn immediate() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
            ready: Ok(()),
        }
    }

    /// Every search waits for a [`release`](Self::release).
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::immediate()
        }
    }

    pub fn not_ready(reason: &str) -> Self {
        Self {
            ready: Err(reason.to_string()),
            ..Self::immediate()
        }
    }

    pub fn push_outcome(&self, outcome: Result<RawSearchResponse, SearchError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn release(&self, searches: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(searches);
        }
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearchProvider {
    async fn search(&self, request: &SearchRequest) -> Result<RawSearchResponse, SearchError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| SearchError::Failed(e.to_string()))?
                .forget();
        }
        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(one_place_response()))
    }

    fn validate(&self) -> Result<(), String> {
        self.ready.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Delivered(Vec<PlaceRecord>),
    Error(String),
}

pub struct RecordingSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ResultSink for RecordingSink {
    fn deliver(&self, places: Vec<PlaceRecord>) {
        let _ = self.tx.send(SinkEvent::Delivered(places));
    }

    fn report_error(&self, message: &str) {
        let _ = self.tx.send(SinkEvent::Error(message.to_string()));
    }
}

pub struct Harness {
    pub handle: SchedulerHandle,
    pub source: Arc<FakeLocationSource>,
    pub provider: Arc<FakeSearchProvider>,
    pub sink_rx: mpsc::UnboundedReceiver<SinkEvent>,
}

impl Harness {
    pub fn start(provider: FakeSearchProvider) -> Self {
        let source = Arc::new(FakeLocationSource::default());
        let provider = Arc::new(provider);
        let (tx, sink_rx) = mpsc::unbounded_channel();
        let handle = InvocationScheduler::spawn(
            source.clone(),
            provider.clone(),
            Arc::new(RecordingSink { tx }),
        );
        Self {
            handle,
            source,
            provider,
            sink_rx,
        }
    }

    pub async fn next_sink_event(&mut self) -> SinkEvent {
        tokio::time::timeout(WAIT, self.sink_rx.recv())
            .await
            .expect("timed out waiting for sink event")
            .expect("sink channel closed")
    }

    pub fn assert_no_sink_event(&mut self) {
        assert!(
            self.sink_rx.try_recv().is_err(),
            "unexpected sink event"
        );
    }

    pub async fn status(&self) -> SchedulerStatus {
        self.handle.status().await.expect("scheduler running")
    }

    /// Wait until `count` searches have completed and been processed.
    pub async fn wait_for_completed(&self, count: u64) -> SchedulerStatus {
        tokio::time::timeout(WAIT, async {
            loop {
                let status = self.status().await;
                if status.searches_completed >= count {
                    return status;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for searches to complete")
    }

    /// Wait until the provider has been called `count` times.
    pub async fn wait_for_requests(&self, count: usize) {
        tokio::time::timeout(WAIT, async {
            while self.provider.requests().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for search requests");
    }
}

pub fn sample(latitude: f64, longitude: f64) -> LocationSample {
    LocationSample::new(latitude, longitude, 12.0, "gps", 1_700_000_000_000)
}

pub fn one_place_response() -> RawSearchResponse {
    RawSearchResponse {
        places: vec![RawPlace {
            latitude: 44.637,
            longitude: -63.574,
            name: Some("Harbour Cafe".to_string()),
            types: vec!["cafe".to_string()],
            ..RawPlace::default()
        }],
        next_page_token: None,
    }
}
