use crate::backend::RobotBackend;
use naobridge_config::RobotConfig;
use naobridge_core::{Command, CommandCodec, Result, Transport, DISCONNECT_NOTICE, READY_NOTICE};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const FRAME_SIZE: usize = 4096;

/// Outbound connection from the robot to the relay's downstream port
pub struct RobotClient {
    server_addr: String,
    codec: Box<dyn CommandCodec>,
    backend: Arc<dyn RobotBackend>,
    reconnect_interval: Duration,
}

impl RobotClient {
    pub fn new(
        server_addr: String,
        codec: Box<dyn CommandCodec>,
        backend: Arc<dyn RobotBackend>,
        reconnect_interval: Duration,
    ) -> Self {
        Self {
            server_addr,
            codec,
            backend,
            reconnect_interval,
        }
    }

    pub fn from_config(config: &RobotConfig, backend: Arc<dyn RobotBackend>) -> Self {
        Self::new(
            config.server_addr.clone(),
            config.wire_format.codec(),
            backend,
            config.reconnect_interval(),
        )
    }

    /// Connect, serve, reconnect; returns once cancelled
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Starting robot client for {}", self.server_addr);

        loop {
            let connected = tokio::select! {
                _ = cancel.cancelled() => break,
                connected = TcpStream::connect(&self.server_addr) => connected,
            };

            match connected {
                Ok(mut socket) => {
                    info!("Connected to {}", self.server_addr);
                    match self.serve_connection(&mut socket, &cancel).await {
                        Ok(()) => info!("Connection to {} closed", self.server_addr),
                        Err(e) => warn!("Connection lost: {}", e),
                    }
                }
                Err(e) => {
                    warn!(
                        "Failed to connect to {}: {}. Retrying in {:?}...",
                        self.server_addr, e, self.reconnect_interval
                    );
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_interval) => {}
            }
        }

        info!("Robot client stopped");
    }

    /// Execute and acknowledge commands until the relay hangs up or we are cancelled
    pub async fn serve_connection<T: Transport>(
        &self,
        socket: &mut T,
        cancel: &CancellationToken,
    ) -> Result<()> {
        socket.write_all(READY_NOTICE.as_bytes()).await?;
        socket.flush().await?;
        debug!("Announced readiness to relay");

        let mut buffer = [0u8; FRAME_SIZE];

        loop {
            let n = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    say_goodbye(socket).await;
                    return Ok(());
                }
                read = socket.read(&mut buffer) => read?,
            };
            if n == 0 {
                return Ok(());
            }

            let ack = match self.handle_frame(&buffer[..n]).await {
                Ok(ack) => ack,
                Err(e) => {
                    warn!("Failed to encode acknowledgment: {}", e);
                    continue;
                }
            };
            if let Err(e) = socket.write_all(&ack).await {
                warn!("Failed to send acknowledgment: {}", e);
            }
        }
    }

    /// Decode and run one frame, returning the acknowledgment to send
    async fn handle_frame(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let decoded = match self.codec.decode(frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    frame = %String::from_utf8_lossy(frame),
                    "Undecodable command: {}", e
                );
                return self.codec.encode_error_ack(&e.to_string());
            }
        };

        debug!(verb = decoded.command.verb(), turn = ?decoded.turn, "Received command");
        if let Err(e) = self.dispatch(&decoded.command).await {
            warn!(verb = decoded.command.verb(), "Robot action failed: {}", e);
        }
        self.codec.encode_ack(&decoded)
    }

    async fn dispatch(&self, command: &Command) -> Result<()> {
        match command {
            Command::Say(text) => self.backend.say(text).await,
            Command::PlayAudio(file) => self.backend.play_audio(file).await,
            Command::Gesture(tokens) => self.backend.gesture(tokens).await,
        }
    }
}

async fn say_goodbye<T: Transport>(socket: &mut T) {
    if let Err(e) = socket.write_all(DISCONNECT_NOTICE.as_bytes()).await {
        debug!("Could not send disconnect notice: {}", e);
    }
    let _ = socket.shutdown().await;
}
