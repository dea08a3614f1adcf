//! `once` and `watch` command handlers.
//!
//! Both wire a [`ReplayLocationSource`], the Google Places client and a
//! [`StdoutSink`] into one scheduler, then drive it until there is nothing
//! left to do.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nearby_core::{AppConfig, TestLocation};
use nearby_places::GooglePlacesClient;
use nearby_scheduler::{InvocationScheduler, SchedulerHandle, SchedulerSettings};
use tokio::sync::mpsc;

use crate::replay::ReplayLocationSource;
use crate::sink::{Outcome, StdoutSink};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Session {
    handle: SchedulerHandle,
    source: Arc<ReplayLocationSource>,
    outcomes: mpsc::UnboundedReceiver<Outcome>,
}

impl Session {
    async fn start(
        config: &AppConfig,
        source: ReplayLocationSource,
        interval_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let provider = GooglePlacesClient::from_app_config(config)?;
        let source = Arc::new(source);
        let (tx, outcomes) = mpsc::unbounded_channel();
        let handle = InvocationScheduler::spawn(
            source.clone(),
            Arc::new(provider),
            Arc::new(StdoutSink::new(tx)),
        );

        let mut settings = SchedulerSettings::from_app_config(config);
        if let Some(secs) = interval_secs {
            settings.interval_secs = secs;
        }
        handle.configure(settings).await?;

        Ok(Self {
            handle,
            source,
            outcomes,
        })
    }

    /// Wait until every dispatched search has come back.
    async fn wait_for_in_flight(&self) -> anyhow::Result<()> {
        loop {
            if self.handle.status().await?.in_flight == 0 {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Take one sample, run one search, print the result.
///
/// The sample comes from `test_location`, `NEARBY_TEST_LOCATION`, or the
/// first unused sample of `track`, in that order.
///
/// # Errors
///
/// Returns an error if configuration is rejected, the provider is not ready,
/// or the search fails.
pub(crate) async fn run_once(
    config: &AppConfig,
    test_location: Option<TestLocation>,
    track: Option<&Path>,
) -> anyhow::Result<()> {
    let source = match track {
        Some(path) => ReplayLocationSource::from_yaml_file(path)?,
        None if test_location.is_some() || config.test_location.is_some() => {
            ReplayLocationSource::new(Vec::new())
        }
        None => anyhow::bail!("`once` needs --lat/--lon, --track or NEARBY_TEST_LOCATION"),
    };

    let mut session = Session::start(config, source, None).await?;
    session.handle.enable_once(test_location).await?;

    let exhausted = session.source.exhausted();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let outcome = loop {
        tokio::select! {
            Some(outcome) = session.outcomes.recv() => break Some(outcome),
            () = exhausted.notified() => {
                tracing::warn!("once: track has no samples left");
                break None;
            }
            _ = ticker.tick() => {
                let status = session.handle.status().await?;
                if !status.enabled && status.in_flight == 0 {
                    break session.outcomes.try_recv().ok();
                }
            }
        }
    };

    session.handle.shutdown().await?;

    match outcome {
        Some(Outcome::Delivered(count)) => {
            tracing::info!(count, "once: search complete");
            Ok(())
        }
        Some(Outcome::Failed(message)) => anyhow::bail!("nearby search failed: {message}"),
        None => {
            tracing::info!("once: no search was performed");
            Ok(())
        }
    }
}

/// Replay `track` through scheduled mode until it runs out or ctrl-c.
///
/// # Errors
///
/// Returns an error if the track cannot be loaded, configuration is rejected
/// or the provider is not ready. Individual search failures are logged and
/// counted, not propagated.
pub(crate) async fn run_watch(
    config: &AppConfig,
    track: &Path,
    interval_secs: Option<u64>,
) -> anyhow::Result<()> {
    let source = ReplayLocationSource::from_yaml_file(track)?;
    let mut session = Session::start(config, source, interval_secs).await?;
    session.handle.enable_scheduled(true).await?;

    let exhausted = session.source.exhausted();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut delivered = 0usize;
    let mut failed = 0usize;
    let mut tally = |outcome: Outcome| match outcome {
        Outcome::Delivered(_) => delivered += 1,
        Outcome::Failed(_) => failed += 1,
    };

    loop {
        tokio::select! {
            Some(outcome) = session.outcomes.recv() => tally(outcome),
            () = exhausted.notified() => {
                tracing::info!("watch: track exhausted; waiting for in-flight searches");
                session.wait_for_in_flight().await?;
                break;
            }
            result = &mut ctrl_c => {
                result?;
                tracing::info!("watch: interrupted");
                break;
            }
        }
    }

    session.handle.enable_scheduled(false).await?;
    session.handle.shutdown().await?;
    while let Ok(outcome) = session.outcomes.try_recv() {
        tally(outcome);
    }

    tracing::info!(delivered, failed, "watch: finished");
    Ok(())
}
