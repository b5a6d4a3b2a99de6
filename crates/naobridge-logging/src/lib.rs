use tracing_subscriber::EnvFilter;

/// Initialize structured JSON logging at `level`.
///
/// `RUST_LOG` still wins over `level` when it is set, so an operator can
/// raise verbosity without touching the YAML config. If a subscriber is
/// already installed it stays in place and a warning records the ignored level.
pub fn init_with_level(level: &str) {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .json()
        .try_init()
    {
        tracing::warn!(level, "Logging already initialized, keeping existing subscriber: {}", e);
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
