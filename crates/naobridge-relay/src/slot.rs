use naobridge_core::{ErrorSeverity, Result};
use naobridge_relay_core::{SlotRole, SlotState, SlotStateMachine};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Drives a slot state machine and publishes every transition
pub(crate) struct SlotMonitor {
    fsm: SlotStateMachine,
    state_tx: watch::Sender<SlotState>,
}

impl SlotMonitor {
    pub(crate) fn new(role: SlotRole) -> (Self, watch::Receiver<SlotState>) {
        let fsm = SlotStateMachine::new(role);
        let (state_tx, state_rx) = watch::channel(fsm.state());
        (Self { fsm, state_tx }, state_rx)
    }

    /// Accepted → Active in one go; the relay has no handshake in between
    pub(crate) fn attach(&mut self, peer: SocketAddr) {
        self.step(|fsm| fsm.accept(peer));
        self.step(SlotStateMachine::activate);
        naobridge_metrics::ACTIVE_CONNECTIONS.inc();
        info!(slot = %self.fsm.role(), %peer, "Peer connected");
    }

    /// Log how the session ended, then Closed → Listening
    pub(crate) fn detach(&mut self, outcome: Result<()>) {
        let role = self.fsm.role();
        let peer = self.fsm.peer();
        match outcome {
            Ok(()) => info!(slot = %role, peer = ?peer, "Session ended"),
            Err(e) => {
                let cause = if e.is_connection_broken() {
                    "Connection lost"
                } else {
                    "Session aborted"
                };
                match e.severity() {
                    ErrorSeverity::Info => info!(slot = %role, peer = ?peer, "{}: {}", cause, e),
                    ErrorSeverity::Warning => warn!(slot = %role, peer = ?peer, "{}: {}", cause, e),
                    ErrorSeverity::Error | ErrorSeverity::Critical => {
                        error!(slot = %role, peer = ?peer, "{}: {}", cause, e)
                    }
                }
            }
        }

        let was_active = self.fsm.is_active();
        self.step(SlotStateMachine::close);
        if was_active {
            naobridge_metrics::ACTIVE_CONNECTIONS.dec();
        }
        info!(slot = %role, "Listening again");
        self.step(SlotStateMachine::relisten);
    }

    fn step<F>(&mut self, transition: F)
    where
        F: FnOnce(&mut SlotStateMachine) -> std::result::Result<(), String>,
    {
        if let Err(e) = transition(&mut self.fsm) {
            warn!(slot = %self.fsm.role(), "Unexpected slot transition: {}", e);
        }
        self.state_tx.send_replace(self.fsm.state());
    }
}
