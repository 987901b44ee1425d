//! A polled rate source with its own subscribers

use super::error::RateError;
use super::listener::{ListenerSet, RateListener};
use super::rate::RateFetcher;
use std::sync::Arc;
use tracing::{debug, instrument};

/// How a freshly fetched rate is compared with the last one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChangeDetection {
    /// Any bitwise difference counts as a change.
    #[default]
    Exact,
    /// Differences up to and including the tolerance are ignored.
    Tolerance(f64),
}

impl ChangeDetection {
    pub fn is_change(&self, previous: Option<f64>, current: f64) -> bool {
        match (previous, self) {
            (None, _) => true,
            (Some(prev), ChangeDetection::Exact) => prev != current,
            (Some(prev), ChangeDetection::Tolerance(eps)) => (prev - current).abs() > *eps,
        }
    }
}

pub struct RateSource {
    name: String,
    last_rate: Option<f64>,
    listeners: ListenerSet,
    fetcher: Box<dyn RateFetcher>,
    change_detection: ChangeDetection,
}

impl RateSource {
    pub fn new(name: impl Into<String>, fetcher: Box<dyn RateFetcher>) -> Self {
        Self {
            name: name.into(),
            last_rate: None,
            listeners: ListenerSet::new(),
            fetcher,
            change_detection: ChangeDetection::default(),
        }
    }

    pub fn with_change_detection(mut self, change_detection: ChangeDetection) -> Self {
        self.change_detection = change_detection;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` until the first successful poll.
    pub fn last_rate(&self) -> Option<f64> {
        self.last_rate
    }

    pub fn register(&mut self, listener: Arc<dyn RateListener>) -> bool {
        self.listeners.insert(listener)
    }

    pub fn unregister(&mut self, listener: &Arc<dyn RateListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn unregister_all(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub async fn fetch_rate(&self) -> Result<f64, RateError> {
        self.fetcher.fetch_rate().await
    }

    /// Fetches once and notifies listeners if the rate moved.
    ///
    /// Returns whether a change was recorded. The stored rate is left
    /// untouched when the fetch fails.
    #[instrument(name = "PollSource", skip(self), fields(source = %self.name))]
    pub async fn poll_for_change(&mut self) -> Result<bool, RateError> {
        let rate = self.fetch_rate().await?;

        if !self.change_detection.is_change(self.last_rate, rate) {
            debug!(rate, "Rate unchanged");
            return Ok(false);
        }

        debug!(previous = ?self.last_rate, rate, "Rate changed");
        self.last_rate = Some(rate);
        self.listeners.notify_all(&self.name, rate);
        Ok(true)
    }
}

impl std::fmt::Debug for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateSource")
            .field("name", &self.name)
            .field("last_rate", &self.last_rate)
            .field("listeners", &self.listeners)
            .field("change_detection", &self.change_detection)
            .finish()
    }
}
