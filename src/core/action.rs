//! Side effects fired when a new lowest rate is found

use console::style;
use tracing::info;

pub trait TradeAction: Send + Sync {
    fn execute(&self, source_name: &str, rate: f64);
}

/// Prints a buy notice to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTradeAction;

impl ConsoleTradeAction {
    pub fn message(source_name: &str, rate: f64) -> String {
        format!("Buying euro from {source_name} at the lowest rate: {rate:?}")
    }
}

impl TradeAction for ConsoleTradeAction {
    fn execute(&self, source_name: &str, rate: f64) {
        info!(source = %source_name, rate, "Executing trade action");
        println!("{}", style(Self::message(source_name, rate)).green().bold());
    }
}
