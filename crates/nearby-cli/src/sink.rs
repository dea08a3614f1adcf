use nearby_core::PlaceRecord;
use nearby_scheduler::ResultSink;
use tokio::sync::mpsc;

/// What the command loop hears about each finished search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Delivered(usize),
    Failed(String),
}

/// Prints each delivered place as one JSON line on stdout; failures go to the log.
pub(crate) struct StdoutSink {
    outcomes: mpsc::UnboundedSender<Outcome>,
}

impl StdoutSink {
    pub(crate) fn new(outcomes: mpsc::UnboundedSender<Outcome>) -> Self {
        Self { outcomes }
    }
}

impl ResultSink for StdoutSink {
    fn deliver(&self, places: Vec<PlaceRecord>) {
        for place in &places {
            match serde_json::to_string(place) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "sink: failed to serialize place"),
            }
        }
        let _ = self.outcomes.send(Outcome::Delivered(places.len()));
    }

    fn report_error(&self, message: &str) {
        tracing::error!(error = message, "sink: nearby search failed");
        let _ = self.outcomes.send(Outcome::Failed(message.to_owned()));
    }
}
