use crate::downstream::Downstream;
use crate::listener;
use crate::slot::SlotMonitor;
use crate::upstream::Upstream;
use naobridge_catalog::Catalog;
use naobridge_config::RelayConfig;
use naobridge_core::{Message, Result};
use naobridge_relay_core::{DeliveryQueue, SlotRole, SlotState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A running relay: both slots accepting, sharing one delivery queue
pub struct RelayHandle {
    game_addr: SocketAddr,
    robot_addr: SocketAddr,
    queue: Arc<DeliveryQueue>,
    upstream_state: watch::Receiver<SlotState>,
    downstream_state: watch::Receiver<SlotState>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Bind both listeners, then start the game and robot tasks.
///
/// Nothing is spawned unless both binds succeed.
pub async fn start_relay(config: &RelayConfig) -> Result<RelayHandle> {
    let game_listener = listener::bind(&config.game_addr())?;
    let robot_listener = listener::bind(&config.robot_addr())?;
    let game_addr = game_listener.local_addr()?;
    let robot_addr = robot_listener.local_addr()?;

    let queue = Arc::new(DeliveryQueue::new());
    let cancel = CancellationToken::new();
    let (upstream_slot, upstream_state) = SlotMonitor::new(SlotRole::Upstream);
    let (downstream_slot, downstream_state) = SlotMonitor::new(SlotRole::Downstream);

    let upstream = Upstream {
        queue: queue.clone(),
        catalog: Arc::new(Catalog::standard()),
        condition: config.condition,
        gesture_style: config.gesture_style,
        ack_policy: config.ack_policy,
    };
    let downstream = Downstream {
        queue: queue.clone(),
        codec: config.wire_format.codec(),
        poll_interval: config.poll_interval(),
        ack_timeout: config.ack_timeout(),
    };

    let tasks = vec![
        tokio::spawn(upstream.run(game_listener, upstream_slot, cancel.clone())),
        tokio::spawn(downstream.run(robot_listener, downstream_slot, cancel.clone())),
    ];

    info!(
        %game_addr,
        %robot_addr,
        condition = config.condition.as_str(),
        wire_format = ?config.wire_format,
        "Relay listening"
    );

    Ok(RelayHandle {
        game_addr,
        robot_addr,
        queue,
        upstream_state,
        downstream_state,
        cancel,
        tasks,
    })
}

impl RelayHandle {
    /// Bound game address (resolves port 0)
    pub fn game_addr(&self) -> SocketAddr {
        self.game_addr
    }

    /// Bound robot address (resolves port 0)
    pub fn robot_addr(&self) -> SocketAddr {
        self.robot_addr
    }

    pub fn queue(&self) -> &Arc<DeliveryQueue> {
        &self.queue
    }

    pub fn slot_state(&self, role: SlotRole) -> SlotState {
        *self.state_rx(role).borrow()
    }

    /// Subscribe to the slot's state transitions
    pub fn watch_slot(&self, role: SlotRole) -> watch::Receiver<SlotState> {
        self.state_rx(role).clone()
    }

    /// Wait until the slot reaches `state`
    pub async fn wait_for_slot(&self, role: SlotRole, state: SlotState) {
        let mut rx = self.watch_slot(role);
        // Sender lives until the slot task exits; nothing to wait for after that.
        let _ = rx.wait_for(|current| *current == state).await;
    }

    fn state_rx(&self, role: SlotRole) -> &watch::Receiver<SlotState> {
        match role {
            SlotRole::Upstream => &self.upstream_state,
            SlotRole::Downstream => &self.downstream_state,
        }
    }

    /// Stop both slots and discard whatever is still queued.
    ///
    /// Returns the discarded messages, oldest first; a message that was
    /// awaiting its ack when the stop came is among them.
    pub async fn stop(self) -> Vec<Message> {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Relay task ended abnormally: {}", e);
            }
        }

        let dropped = self.queue.clear();
        if !dropped.is_empty() {
            warn!(count = dropped.len(), "Discarding undelivered messages");
        }
        naobridge_metrics::QUEUE_DEPTH.set(0);
        info!("Relay stopped");
        dropped
    }
}
