use anyhow::Context;
use naobridge_config::RobotConfig;
use naobridge_robot::{RobotClient, SimulatedRobot};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let config: RobotConfig =
        naobridge_config::load_or_default(path.as_deref()).context("loading robot config")?;

    // Initialize logging
    naobridge_logging::init_with_level(&config.log_level);

    info!(
        service = "robot",
        version = env!("CARGO_PKG_VERSION"),
        server = %config.server_addr,
        "Starting robot adapter"
    );

    let backend = Arc::new(SimulatedRobot::new(config.audio_dir.clone()));
    let client = RobotClient::from_config(&config, backend);

    let cancel = CancellationToken::new();
    let runner = {
        let cancel = cancel.clone();
        tokio::spawn(async move { client.run(cancel).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutdown requested");

    cancel.cancel();
    runner.await.context("robot client task")?;
    Ok(())
}
