use anyhow::Context;
use naobridge_config::RelayConfig;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let config: RelayConfig =
        naobridge_config::load_or_default(path.as_deref()).context("loading relay config")?;

    // Initialize logging
    naobridge_logging::init_with_level(&config.log_level);

    // Register metrics
    naobridge_metrics::register_metrics();

    info!(
        service = "relay",
        version = env!("CARGO_PKG_VERSION"),
        "Starting game-to-robot relay"
    );

    let relay = match naobridge_relay::start_relay(&config).await {
        Ok(relay) => relay,
        Err(e) => {
            error!("Relay failed to start: {}", e);
            return Err(e.into());
        }
    };

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutdown requested");

    relay.stop().await;
    debug!(metrics = %naobridge_metrics::gather_metrics(), "Final metrics");
    Ok(())
}
