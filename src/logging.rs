use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CROP_DEMAND_LOG";

/// Install the global subscriber. `CROP_DEMAND_LOG` overrides the level,
/// otherwise `info` (or `warn` when quiet).
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
