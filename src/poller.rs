//! Drives periodic sweeps over all rate sources.

use crate::core::RateSource;
use crate::core::config::SweepMode;
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Outcome of one pass over all sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub polled: usize,
    pub changed: usize,
    pub failed: usize,
}

pub struct PollLoop {
    sources: Vec<RateSource>,
    interval: Duration,
    mode: SweepMode,
    sweeps: u64,
}

impl PollLoop {
    pub fn new(sources: Vec<RateSource>) -> Self {
        Self {
            sources,
            interval: DEFAULT_POLL_INTERVAL,
            mode: SweepMode::default(),
            sweeps: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_mode(mut self, mode: SweepMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sources(&self) -> &[RateSource] {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut [RateSource] {
        &mut self.sources
    }

    pub fn source_mut(&mut self, name: &str) -> Option<&mut RateSource> {
        self.sources.iter_mut().find(|s| s.name() == name)
    }

    /// Number of completed sweeps.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Polls every source once. A failing source is logged and skipped.
    pub async fn sweep(&mut self) -> SweepReport {
        let outcomes = match self.mode {
            SweepMode::Sequential => {
                let mut outcomes = Vec::with_capacity(self.sources.len());
                for source in self.sources.iter_mut() {
                    let outcome = source.poll_for_change().await;
                    outcomes.push((source.name().to_string(), outcome));
                }
                outcomes
            }
            SweepMode::Concurrent => {
                join_all(self.sources.iter_mut().map(|source| async move {
                    let outcome = source.poll_for_change().await;
                    (source.name().to_string(), outcome)
                }))
                .await
            }
        };

        let mut report = SweepReport {
            polled: outcomes.len(),
            ..SweepReport::default()
        };
        for (name, outcome) in outcomes {
            match outcome {
                Ok(true) => report.changed += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(source = %name, error = %e, parse_error = e.is_parse(), "Rate fetch failed");
                }
            }
        }

        self.sweeps += 1;
        debug!(sweep = self.sweeps, ?report, "Sweep finished");
        report
    }

    /// Sweeps every interval until `shutdown` resolves.
    ///
    /// A sweep in flight when `shutdown` fires is abandoned; every source
    /// stores its rate only after a completed fetch, so no source is left
    /// half updated.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            sources = self.sources.len(),
            interval = ?self.interval,
            mode = ?self.mode,
            "Starting poll loop"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.sweep() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(sweeps = self.sweeps, "Poll loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::tests::{RecordingListener, ScriptedFetcher};
    use crate::core::tracker::tests::RecordingAction;
    use crate::core::{LowestRateTracker, RateError, RateFetcher, RateListener};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn source(name: &str, script: Vec<Result<f64, RateError>>) -> (RateSource, Arc<AtomicUsize>) {
        let fetcher = ScriptedFetcher::new(script);
        let calls = fetcher.calls.clone();
        (RateSource::new(name, Box::new(fetcher)), calls)
    }

    fn wired(
        sources: Vec<RateSource>,
        mode: SweepMode,
    ) -> (PollLoop, Arc<LowestRateTracker>, Arc<RecordingAction>) {
        let action = Arc::new(RecordingAction::default());
        let tracker = Arc::new(LowestRateTracker::new(action.clone()));
        let mut poll_loop = PollLoop::new(sources).with_mode(mode);
        for source in poll_loop.sources_mut() {
            source.register(tracker.clone());
        }
        (poll_loop, tracker, action)
    }

    #[tokio::test]
    async fn test_two_sweep_scenario() {
        let (nbp, _) = source("NBP", vec![Ok(4.30), Ok(4.20)]);
        let (ecb, _) = source("ECB", vec![Ok(4.25), Ok(4.25)]);
        let (exch, _) = source("Exchangerate", vec![Ok(4.35), Ok(4.35)]);
        let (mut poll_loop, tracker, action) =
            wired(vec![nbp, ecb, exch], SweepMode::Sequential);

        let report = poll_loop.sweep().await;
        assert_eq!(
            report,
            SweepReport {
                polled: 3,
                changed: 3,
                failed: 0
            }
        );
        assert_eq!(
            action.trades(),
            vec![("NBP".to_string(), 4.30), ("ECB".to_string(), 4.25)]
        );

        let report = poll_loop.sweep().await;
        assert_eq!(report.changed, 1);
        assert_eq!(
            action.trades(),
            vec![
                ("NBP".to_string(), 4.30),
                ("ECB".to_string(), 4.25),
                ("NBP".to_string(), 4.20)
            ]
        );

        let lowest = tracker.lowest().unwrap();
        assert_eq!(lowest.source, "NBP");
        assert_eq!(lowest.rate, 4.20);
        assert_eq!(poll_loop.sweeps(), 2);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_stop_sweep() {
        let (nbp, nbp_calls) = source("NBP", vec![Err(RateError::parse("missing field `rates`"))]);
        let (ecb, ecb_calls) = source("ECB", vec![Ok(4.25)]);
        let (exch, exch_calls) = source("Exchangerate", vec![Ok(4.22)]);
        let (mut poll_loop, tracker, _) = wired(vec![nbp, ecb, exch], SweepMode::Sequential);

        let report = poll_loop.sweep().await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.changed, 2);
        assert_eq!(nbp_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ecb_calls.load(Ordering::SeqCst), 1);
        assert_eq!(exch_calls.load(Ordering::SeqCst), 1);
        assert!(poll_loop.sources()[0].last_rate().is_none());
        assert_eq!(tracker.lowest().unwrap().source, "Exchangerate");
    }

    #[tokio::test]
    async fn test_concurrent_sweep_end_state() {
        let (nbp, _) = source("NBP", vec![Ok(4.30)]);
        let (ecb, _) = source("ECB", vec![Err(RateError::parse("no PLN"))]);
        let (exch, _) = source("Exchangerate", vec![Ok(4.21)]);
        let (mut poll_loop, tracker, action) =
            wired(vec![nbp, ecb, exch], SweepMode::Concurrent);

        let report = poll_loop.sweep().await;

        assert_eq!(report.polled, 3);
        assert_eq!(report.failed, 1);
        let lowest = tracker.lowest().unwrap();
        assert_eq!((lowest.source.as_str(), lowest.rate), ("Exchangerate", 4.21));
        assert!(action.trades().contains(&("Exchangerate".to_string(), 4.21)));
    }

    #[tokio::test]
    async fn test_unregister_mid_run() {
        let (nbp, _) = source("NBP", vec![Ok(4.30), Ok(4.10)]);
        let listener = Arc::new(RecordingListener::default());
        let as_dyn: Arc<dyn RateListener> = listener.clone();
        let mut poll_loop = PollLoop::new(vec![nbp]);
        poll_loop.source_mut("NBP").unwrap().register(as_dyn.clone());

        poll_loop.sweep().await;
        assert!(poll_loop.source_mut("NBP").unwrap().unregister(&as_dyn));
        poll_loop.sweep().await;

        assert_eq!(listener.events(), vec![("NBP".to_string(), 4.30)]);
        assert_eq!(poll_loop.sources()[0].last_rate(), Some(4.10));
    }

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RateFetcher for CountingFetcher {
        async fn fetch_rate(&self) -> Result<f64, RateError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(4.5 - n as f64 / 100.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_sweeps_every_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
        };
        let mut poll_loop = PollLoop::new(vec![RateSource::new("NBP", Box::new(fetcher))]);
        assert_eq!(poll_loop.interval(), Duration::from_millis(2500));

        // Sweeps at 0s, 2.5s and 5s; stop before the one at 7.5s.
        poll_loop
            .run_until(tokio::time::sleep(Duration::from_secs(6)))
            .await;

        assert_eq!(poll_loop.sweeps(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stops_on_signal() {
        let (nbp, calls) = source("NBP", vec![Ok(4.30)]);
        let mut poll_loop = PollLoop::new(vec![nbp]).with_interval(Duration::from_secs(60));
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            poll_loop
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await;
            poll_loop
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        stop_tx.send(()).unwrap();

        let poll_loop = handle.await.unwrap();
        assert_eq!(poll_loop.sweeps(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
