//! Tracks the lowest rate seen across all sources

use super::action::TradeAction;
use super::listener::RateListener;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct LowestRate {
    pub source: String,
    pub rate: f64,
    pub observed_at: DateTime<Utc>,
}

/// Remembers the lowest rate ever reported and fires the trade action each
/// time it's strictly beaten. The minimum is never reset.
pub struct LowestRateTracker {
    lowest: Mutex<Option<LowestRate>>,
    action: Arc<dyn TradeAction>,
}

impl LowestRateTracker {
    pub fn new(action: Arc<dyn TradeAction>) -> Self {
        Self {
            lowest: Mutex::new(None),
            action,
        }
    }

    pub fn lowest(&self) -> Option<LowestRate> {
        self.state().clone()
    }

    // A panic inside the trade action must not wedge the tracker.
    fn state(&self) -> MutexGuard<'_, Option<LowestRate>> {
        self.lowest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RateListener for LowestRateTracker {
    fn on_rate_changed(&self, source_name: &str, new_rate: f64) {
        let mut lowest = self.state();
        let qualifies = match lowest.as_ref() {
            None => true,
            Some(current) => new_rate < current.rate,
        };

        if !qualifies {
            debug!(source = %source_name, rate = new_rate, "Rate is not below current minimum");
            return;
        }

        *lowest = Some(LowestRate {
            source: source_name.to_string(),
            rate: new_rate,
            observed_at: Utc::now(),
        });

        // Held across the action so that concurrent updates stay ordered.
        self.action.execute(source_name, new_rate);
    }
}
