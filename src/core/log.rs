use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Picks the active filters. A `RUST_LOG` filter is used on its own; without
/// one, the crate logs at info (debug when verbose) and dependencies at warn.
fn filters(verbose: bool, from_env: Option<EnvFilter>) -> (Option<Targets>, EnvFilter) {
    if let Some(env_filter) = from_env {
        return (None, env_filter);
    }

    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::INFO, "info")
    };
    let app_filter = Targets::new()
        .with_target("ratewatch", level_filter)
        .with_default(LevelFilter::WARN);
    (Some(app_filter), EnvFilter::new(level))
}

/// Installs the global subscriber. `RUST_LOG` overrides the default levels.
pub fn init_logging(verbose: bool) {
    let (app_filter, env_filter) = filters(verbose, EnvFilter::try_from_default_env().ok());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
