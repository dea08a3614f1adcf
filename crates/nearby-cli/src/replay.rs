//! A location source that replays a recorded track.
//!
//! A sampling pass reads the track forward from where the last pass stopped,
//! covering every sample recorded within `duration_secs` of the first one.
//! It stops early at the first fix whose accuracy (meters, lower is better)
//! is within `good_enough_accuracy`; otherwise it emits the most accurate fix
//! of the window. A one-shot arm runs exactly one pass. Passes are paced by
//! the armed interval. Once the track runs out the source signals
//! [`ReplayLocationSource::exhausted`] and stops.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use nearby_core::LocationSample;
use nearby_scheduler::{ArmRequest, LocationSource, SampleSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub(crate) struct ReplayLocationSource {
    track: Arc<[LocationSample]>,
    cursor: Arc<Mutex<usize>>,
    exhausted: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReplayLocationSource {
    pub(crate) fn new(track: Vec<LocationSample>) -> Self {
        Self {
            track: track.into(),
            cursor: Arc::new(Mutex::new(0)),
            exhausted: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    /// Load a YAML list of samples. `accuracy`, `provider` and `timestamp`
    /// may be omitted.
    pub(crate) fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read track file {}", path.display()))?;
        let track = parse_track(&text)
            .with_context(|| format!("failed to parse track file {}", path.display()))?;
        tracing::info!(path = %path.display(), samples = track.len(), "replay: loaded track");
        Ok(Self::new(track))
    }

    /// Notified once an armed pass finds no samples left.
    pub(crate) fn exhausted(&self) -> Arc<Notify> {
        Arc::clone(&self.exhausted)
    }
}

pub(crate) fn parse_track(text: &str) -> Result<Vec<LocationSample>, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

/// One sampling pass over `track` starting at `start`.
///
/// Returns the chosen sample and the index the next pass starts from, or
/// `None` once `start` is past the end. Samples without an accuracy (0) count
/// as good enough.
pub(crate) fn select_pass(
    track: &[LocationSample],
    start: usize,
    duration_secs: u64,
    good_enough: f32,
) -> Option<(LocationSample, usize)> {
    let first = track.get(start)?;
    let window_ms = i64::try_from(duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX);

    let mut best = start;
    let mut next = start;
    for (index, sample) in track.iter().enumerate().skip(start) {
        if index > start && sample.timestamp.saturating_sub(first.timestamp) > window_ms {
            break;
        }
        next = index + 1;
        if sample.accuracy < track[best].accuracy {
            best = index;
        }
        if sample.accuracy <= good_enough {
            best = index;
            break;
        }
    }
    Some((track[best].clone(), next))
}

impl LocationSource for ReplayLocationSource {
    fn arm(&self, request: &ArmRequest, samples: SampleSender) {
        self.disarm();

        let track = Arc::clone(&self.track);
        let cursor = Arc::clone(&self.cursor);
        let exhausted = Arc::clone(&self.exhausted);
        let one_shot = request.one_shot;
        let duration_secs = request.duration_secs;
        let good_enough = f32::from(request.good_enough_accuracy);
        let period = Duration::from_secs(request.interval_secs.max(1));

        tracing::debug!(
            one_shot,
            interval_secs = request.interval_secs,
            duration_secs,
            good_enough,
            "replay: armed"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let pass = {
                    let mut cursor = cursor.lock().unwrap_or_else(PoisonError::into_inner);
                    let pass = select_pass(&track, *cursor, duration_secs, good_enough);
                    if let Some((_, next)) = &pass {
                        *cursor = *next;
                    }
                    pass
                };
                let Some((sample, next)) = pass else {
                    tracing::info!(samples = track.len(), "replay: track exhausted");
                    exhausted.notify_one();
                    break;
                };
                tracing::debug!(next, accuracy = sample.accuracy, "replay: pass complete");
                if !samples.send(sample) || one_shot {
                    break;
                }
            }
        });

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    fn disarm(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use nearby_core::{RawSearchResponse, SearchError, SearchProvider, SearchRequest};
    use nearby_scheduler::InvocationScheduler;
    use tokio::sync::mpsc;

    use super::*;
    use crate::sink::{Outcome, StdoutSink};

    const TRACK: &str = "
- latitude: 44.6356
  longitude: -63.5757
  accuracy: 8.5
  provider: gps
  timestamp: 1700000000000
- latitude: 44.6488
  longitude: -63.5752
";

    #[derive(Default)]
    struct EchoProvider {
        requests: Mutex<Vec<SearchRequest>>,
    }

    #[async_trait]
    impl SearchProvider for EchoProvider {
        async fn search(&self, request: &SearchRequest) -> Result<RawSearchResponse, SearchError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(RawSearchResponse::default())
        }
    }

    async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<Outcome>) -> Outcome {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for outcome")
            .expect("sink closed")
    }

    #[test]
    fn parses_track_with_optional_fields() {
        let track = parse_track(TRACK).expect("valid track");
        assert_eq!(track.len(), 2);
        assert_eq!(track[0].provider, "gps");
        assert!((track[0].accuracy - 8.5).abs() < f32::EPSILON);
        assert_eq!(track[1].provider, "");
        assert_eq!(track[1].timestamp, 0);
    }

    #[test]
    fn rejects_track_without_coordinates() {
        assert!(parse_track("- latitude: 1.0\n").is_err());
    }

    fn fix(accuracy: f32, timestamp: i64) -> LocationSample {
        LocationSample {
            latitude: 44.0 + f64::from(accuracy) / 1000.0,
            longitude: -63.0,
            accuracy,
            provider: "gps".to_owned(),
            timestamp,
        }
    }

    #[test]
    fn pass_stops_at_first_good_enough_fix() {
        let track = vec![fix(50.0, 0), fix(10.0, 1000), fix(5.0, 2000)];
        let (sample, next) = select_pass(&track, 0, 30, 20.0).expect("pass");
        assert!((sample.accuracy - 10.0).abs() < f32::EPSILON);
        assert_eq!(next, 2);
    }

    #[test]
    fn pass_emits_most_accurate_fix_within_duration() {
        let track = vec![
            fix(60.0, 0),
            fix(30.0, 4000),
            fix(40.0, 8000),
            fix(5.0, 12_000),
        ];
        let (sample, next) = select_pass(&track, 0, 10, 20.0).expect("pass");
        assert!((sample.accuracy - 30.0).abs() < f32::EPSILON);
        assert_eq!(next, 3);

        let (sample, next) = select_pass(&track, next, 10, 20.0).expect("second pass");
        assert!((sample.accuracy - 5.0).abs() < f32::EPSILON);
        assert_eq!(next, 4);
    }

    #[test]
    fn pass_past_end_of_track_is_none() {
        let track = vec![fix(5.0, 0)];
        assert!(select_pass(&track, 1, 30, 20.0).is_none());
        assert!(select_pass(&[], 0, 30, 20.0).is_none());
    }

    #[test]
    fn fix_without_accuracy_counts_as_good_enough() {
        let track = vec![fix(90.0, 0), fix(0.0, 1000), fix(1.0, 2000)];
        let (sample, next) = select_pass(&track, 0, 30, 20.0).expect("pass");
        assert!(sample.accuracy.abs() < f32::EPSILON);
        assert_eq!(next, 2);
    }

    #[test]
    fn zero_duration_pass_covers_a_single_fix() {
        let track = vec![fix(90.0, 0), fix(10.0, 1000)];
        let (sample, next) = select_pass(&track, 0, 0, 20.0).expect("pass");
        assert!((sample.accuracy - 90.0).abs() < f32::EPSILON);
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn one_shot_arms_consume_one_sample_each() {
        let source = Arc::new(ReplayLocationSource::new(parse_track(TRACK).unwrap()));
        let provider = Arc::new(EchoProvider::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = InvocationScheduler::spawn(
            source.clone(),
            provider.clone(),
            Arc::new(StdoutSink::new(tx)),
        );

        handle.enable_once(None).await.unwrap();
        assert_eq!(next_outcome(&mut rx).await, Outcome::Delivered(0));
        handle.enable_once(None).await.unwrap();
        assert_eq!(next_outcome(&mut rx).await, Outcome::Delivered(0));

        let latitudes: Vec<f64> = provider
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.latitude)
            .collect();
        assert_eq!(latitudes, vec![44.6356, 44.6488]);
    }

    #[tokio::test]
    async fn empty_track_signals_exhaustion() {
        let source = Arc::new(ReplayLocationSource::new(Vec::new()));
        let exhausted = source.exhausted();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = InvocationScheduler::spawn(
            source.clone(),
            Arc::new(EchoProvider::default()),
            Arc::new(StdoutSink::new(tx)),
        );

        handle.enable_scheduled(true).await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), exhausted.notified())
            .await
            .expect("exhaustion should be signalled");
    }
}
