use crate::slot::SlotMonitor;
use naobridge_catalog::{Catalog, Condition, GestureStyle, SessionContext};
use naobridge_core::{BridgeError, Result, Transport};
use naobridge_metrics::{EVENTS_RECEIVED, MALFORMED_FRAMES, MESSAGES_ENQUEUED, QUEUE_DEPTH};
use naobridge_relay_core::{AckPolicy, DeliveryQueue, UpstreamAction, UpstreamHandler};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const FRAME_SIZE: usize = 4096;

/// Game-side slot: reads turn events and feeds the delivery queue
pub(crate) struct Upstream {
    pub(crate) queue: Arc<DeliveryQueue>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) condition: Condition,
    pub(crate) gesture_style: Option<GestureStyle>,
    pub(crate) ack_policy: AckPolicy,
}

impl Upstream {
    /// Accept loop; one game connection at a time until cancelled
    pub(crate) async fn run(
        self,
        listener: TcpListener,
        mut slot: SlotMonitor,
        cancel: CancellationToken,
    ) {
        loop {
            let (mut socket, peer) = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Game accept error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        continue;
                    }
                },
            };

            slot.attach(peer);
            let mut handler = UpstreamHandler::new(self.new_session(), self.ack_policy);

            let outcome = self.serve(&mut socket, &mut handler, &cancel).await;
            slot.detach(outcome);
        }

        info!("Game slot stopped");
    }

    fn new_session(&self) -> SessionContext {
        let session = SessionContext::new(self.catalog.clone(), self.condition);
        match self.gesture_style {
            Some(style) => session.with_style(style),
            None => session,
        }
    }

    /// Handle one game connection until it closes or the relay stops
    pub(crate) async fn serve<T: Transport>(
        &self,
        socket: &mut T,
        handler: &mut UpstreamHandler,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut buffer = [0u8; FRAME_SIZE];

        loop {
            let n = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                read = socket.read(&mut buffer) => read?,
            };
            if n == 0 {
                return Ok(());
            }

            debug!("Received {} bytes from game", n);

            for action in handler.on_frame(&buffer[..n]) {
                match action {
                    UpstreamAction::Enqueue(messages) => {
                        EVENTS_RECEIVED.inc();
                        MESSAGES_ENQUEUED.inc_by(messages.len() as u64);
                        for message in &messages {
                            info!(
                                message_id = message.id,
                                turn = %message.turn,
                                payload = %message.payload(),
                                "Queued message for robot"
                            );
                        }
                        let depth = self.queue.extend(messages);
                        QUEUE_DEPTH.set(depth as i64);
                    }
                    UpstreamAction::Reply(bytes) => {
                        // Best-effort: the event is already queued either way.
                        if let Err(e) = write_frame(socket, &bytes).await {
                            if e.is_connection_broken() {
                                return Err(e);
                            }
                            warn!("Failed to acknowledge game frame: {}", e);
                        }
                    }
                    UpstreamAction::Discard { reason } => {
                        MALFORMED_FRAMES.inc();
                        debug!(%reason, "Dropped game frame");
                    }
                }
            }
        }
    }
}

async fn write_frame<T: Transport>(socket: &mut T, bytes: &[u8]) -> Result<()> {
    socket.write_all(bytes).await.map_err(BridgeError::from)?;
    socket.flush().await?;
    Ok(())
}
