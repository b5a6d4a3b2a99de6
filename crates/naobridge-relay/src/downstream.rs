use crate::slot::SlotMonitor;
use naobridge_core::{
    BridgeError, CommandCodec, Result, Transport, DISCONNECT_NOTICE, READY_NOTICE,
};
use naobridge_metrics::{MESSAGES_DELIVERED, MESSAGES_REQUEUED, QUEUE_DEPTH};
use naobridge_relay_core::DeliveryQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const ACK_BUFFER_SIZE: usize = 1024;

enum Delivery {
    Acked,
    Cancelled,
}

/// Robot-side slot: drains the delivery queue one acknowledged message at a time
pub(crate) struct Downstream {
    pub(crate) queue: Arc<DeliveryQueue>,
    pub(crate) codec: Box<dyn CommandCodec>,
    pub(crate) poll_interval: Duration,
    pub(crate) ack_timeout: Duration,
}

impl Downstream {
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
                        error!("Robot accept error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        continue;
                    }
                },
            };

            slot.attach(peer);
            let outcome = self.serve(&mut socket, &cancel).await;
            slot.detach(outcome);
        }

        info!("Robot slot stopped");
    }

    /// Serve one robot connection: flush the backlog, then wait for new
    /// messages while watching the socket for a hang-up
    pub(crate) async fn serve<T: Transport>(
        &self,
        socket: &mut T,
        cancel: &CancellationToken,
    ) -> Result<()> {
        discard_pending(socket).await?;
        self.drain(socket, cancel).await?;

        let mut liveness = [0u8; ACK_BUFFER_SIZE];
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                read = socket.read(&mut liveness) => {
                    let n = read?;
                    if n == 0 || is_notice(&liveness[..n], DISCONNECT_NOTICE) {
                        return Err(BridgeError::PeerClosed);
                    }
                    debug!(
                        data = %String::from_utf8_lossy(&liveness[..n]),
                        "Ignoring unsolicited robot data"
                    );
                }
                _ = self.queue.wait_for_push() => {}
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            self.drain(socket, cancel).await?;
        }
    }

    async fn drain<T: Transport>(&self, socket: &mut T, cancel: &CancellationToken) -> Result<()> {
        while !cancel.is_cancelled() {
            let Some(message) = self.queue.pop_front() else {
                break;
            };
            QUEUE_DEPTH.set(self.queue.len() as i64);

            let frame = self.codec.encode(&message);
            match self.deliver(socket, &frame, cancel).await {
                Ok(Delivery::Acked) => {
                    MESSAGES_DELIVERED.inc();
                    info!(
                        message_id = message.id,
                        turn = %message.turn,
                        payload = %message.payload(),
                        "Delivered message to robot"
                    );
                }
                Ok(Delivery::Cancelled) => {
                    debug!(message_id = message.id, "Stopped while awaiting ack, requeueing");
                    self.queue.requeue_front(message);
                    QUEUE_DEPTH.set(self.queue.len() as i64);
                    return Ok(());
                }
                Err(e) => {
                    warn!(message_id = message.id, "Delivery failed, requeueing: {}", e);
                    self.queue.requeue_front(message);
                    MESSAGES_REQUEUED.inc();
                    QUEUE_DEPTH.set(self.queue.len() as i64);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn deliver<T: Transport>(
        &self,
        socket: &mut T,
        frame: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Delivery> {
        socket.write_all(frame).await?;
        socket.flush().await?;

        let deadline = Instant::now() + self.ack_timeout;
        let mut buffer = [0u8; ACK_BUFFER_SIZE];
        loop {
            let n = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Delivery::Cancelled),
                read = tokio::time::timeout_at(deadline, socket.read(&mut buffer)) => match read {
                    Ok(read) => read?,
                    Err(_) => return Err(BridgeError::AckTimeout(self.ack_timeout)),
                },
            };

            let data = &buffer[..n];
            if n == 0 || is_notice(data, DISCONNECT_NOTICE) {
                return Err(BridgeError::PeerClosed);
            }
            // A late greeting is not an acknowledgment
            if is_notice(data, READY_NOTICE) {
                debug!("Robot greeting arrived during ack wait");
                continue;
            }

            debug!(ack = %String::from_utf8_lossy(data), "Robot acknowledged");
            return Ok(Delivery::Acked);
        }
    }
}

/// Consume whatever the robot sent before the first delivery
async fn discard_pending<T: Transport>(socket: &mut T) -> Result<()> {
    let mut buffer = [0u8; ACK_BUFFER_SIZE];
    // A zero timeout still polls the read once, so only already-buffered bytes are taken
    while let Ok(read) = tokio::time::timeout(Duration::ZERO, socket.read(&mut buffer)).await {
        let n = read?;
        let data = &buffer[..n];
        if n == 0 || is_notice(data, DISCONNECT_NOTICE) {
            return Err(BridgeError::PeerClosed);
        }
        if is_notice(data, READY_NOTICE) {
            info!("Robot is ready to receive commands");
        } else {
            debug!(data = %String::from_utf8_lossy(data), "Discarding stale robot data");
        }
    }
    Ok(())
}

fn is_notice(data: &[u8], notice: &str) -> bool {
    data.trim_ascii() == notice.as_bytes()
}
