pub mod core;
pub mod poller;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{ConsoleTradeAction, LowestRateTracker, RateSource, TradeAction};
use crate::poller::PollLoop;
use anyhow::Result;
use console::style;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Poll until interrupted.
    Watch,
    /// Run a single sweep and print the result.
    Sweep,
}

/// Wires sources, the lowest-rate tracker and the poll loop from config.
pub fn build_poll_loop(
    config: &AppConfig,
    action: Arc<dyn TradeAction>,
) -> Result<(PollLoop, Arc<LowestRateTracker>)> {
    config.validate()?;

    let client = providers::util::build_client(config.request_timeout()?)?;
    let tracker = Arc::new(LowestRateTracker::new(action));

    let sources = config
        .sources
        .iter()
        .map(|source_config| {
            let fetcher = providers::fetcher_for(source_config, client.clone());
            let mut source = RateSource::new(source_config.display_name(), fetcher)
                .with_change_detection(config.change_detection());
            source.register(tracker.clone());
            source
        })
        .collect();

    let poll_loop = PollLoop::new(sources)
        .with_interval(config.poll_interval()?)
        .with_mode(config.sweep_mode);

    Ok((poll_loop, tracker))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rate watch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let (mut poll_loop, tracker) = build_poll_loop(&config, Arc::new(ConsoleTradeAction))?;

    match command {
        AppCommand::Watch => poll_loop.run_until(shutdown_signal()).await,
        AppCommand::Sweep => {
            poll_loop.sweep().await;
            println!("{}", render_sweep_summary(&poll_loop, &tracker));
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Resolves once `signal` fires. If the signal can't be listened for, never
/// resolves, so the loop keeps polling until the process is killed.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Interrupt received, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C, polling until killed");
            std::future::pending::<()>().await
        }
    }
}

pub fn render_sweep_summary(poll_loop: &PollLoop, tracker: &LowestRateTracker) -> String {
    let mut output = format!("{}\n", style("EUR/PLN rates").bold().underlined());

    for source in poll_loop.sources() {
        let rate = source
            .last_rate()
            .map_or_else(|| style("N/A".to_string()).dim(), |r| style(format!("{r:.4}")));
        output.push_str(&format!("  {:<16}{}\n", source.name(), rate));
    }

    match tracker.lowest() {
        Some(lowest) => output.push_str(&format!(
            "{} {} ({}, {})",
            style("Lowest:").bold(),
            style(format!("{:.4}", lowest.rate)).green().bold(),
            lowest.source,
            lowest.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        None => output.push_str(&style("No rate available").red().to_string()),
    }

    output
}
