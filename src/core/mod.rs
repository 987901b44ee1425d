//! Core rate watching abstractions

pub mod action;
pub mod config;
pub mod error;
pub mod listener;
pub mod log;
pub mod rate;
pub mod source;
pub mod tracker;

// Re-export main types for cleaner imports
pub use action::{ConsoleTradeAction, TradeAction};
pub use error::RateError;
pub use listener::{ListenerSet, RateListener};
pub use rate::{RateFetcher, ensure_valid_rate};
pub use source::{ChangeDetection, RateSource};
pub use tracker::{LowestRate, LowestRateTracker};
