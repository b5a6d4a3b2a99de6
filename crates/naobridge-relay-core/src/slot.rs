use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Which peer a connection slot serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRole {
    /// The game, producing turn events
    Upstream,
    /// The robot, consuming commands
    Downstream,
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => f.write_str("upstream"),
            Self::Downstream => f.write_str("downstream"),
        }
    }
}

/// Connection slot state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// Waiting in accept
    Listening,

    /// Peer accepted, not yet serving
    Accepted,

    /// Serving the peer
    Active,

    /// Connection torn down, about to listen again
    Closed,
}

/// Connection slot state machine: `Listening → Accepted → Active → Closed → Listening`
pub struct SlotStateMachine {
    role: SlotRole,
    current_state: SlotState,
    peer: Option<SocketAddr>,
}

impl SlotStateMachine {
    /// Create new state machine, listening
    pub fn new(role: SlotRole) -> Self {
        Self {
            role,
            current_state: SlotState::Listening,
            peer: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> SlotState {
        self.current_state
    }

    pub fn role(&self) -> SlotRole {
        self.role
    }

    /// Address of the attached peer, if any
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Transition to Accepted state
    pub fn accept(&mut self, peer: SocketAddr) -> Result<(), String> {
        match self.current_state {
            SlotState::Listening => {
                self.current_state = SlotState::Accepted;
                self.peer = Some(peer);
                Ok(())
            }
            _ => Err(format!(
                "{} slot cannot accept from state {:?}",
                self.role, self.current_state
            )),
        }
    }

    /// Transition to Active state
    pub fn activate(&mut self) -> Result<(), String> {
        match self.current_state {
            SlotState::Accepted => {
                self.current_state = SlotState::Active;
                Ok(())
            }
            _ => Err(format!(
                "{} slot cannot activate from state {:?}",
                self.role, self.current_state
            )),
        }
    }

    /// Transition to Closed state, dropping the peer
    pub fn close(&mut self) -> Result<(), String> {
        match self.current_state {
            SlotState::Accepted | SlotState::Active => {
                self.current_state = SlotState::Closed;
                self.peer = None;
                Ok(())
            }
            _ => Err(format!(
                "{} slot cannot close from state {:?}",
                self.role, self.current_state
            )),
        }
    }

    /// Transition back to Listening state
    pub fn relisten(&mut self) -> Result<(), String> {
        match self.current_state {
            SlotState::Closed => {
                self.current_state = SlotState::Listening;
                Ok(())
            }
            _ => Err(format!(
                "{} slot cannot listen from state {:?}",
                self.role, self.current_state
            )),
        }
    }

    /// Check if slot is serving a peer
    pub fn is_active(&self) -> bool {
        self.current_state == SlotState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[test]
    fn test_state_machine_initialization() {
        let sm = SlotStateMachine::new(SlotRole::Downstream);
        assert_eq!(sm.state(), SlotState::Listening);
        assert_eq!(sm.role(), SlotRole::Downstream);
        assert!(sm.peer().is_none());
        assert!(!sm.is_active());
    }

    #[test]
    fn test_full_cycle() {
        let mut sm = SlotStateMachine::new(SlotRole::Upstream);

        // Listening -> Accepted
        assert!(sm.accept(peer()).is_ok());
        assert_eq!(sm.state(), SlotState::Accepted);
        assert_eq!(sm.peer(), Some(peer()));

        // Accepted -> Active
        assert!(sm.activate().is_ok());
        assert!(sm.is_active());

        // Active -> Closed
        assert!(sm.close().is_ok());
        assert_eq!(sm.state(), SlotState::Closed);
        assert!(sm.peer().is_none());

        // Closed -> Listening
        assert!(sm.relisten().is_ok());
        assert_eq!(sm.state(), SlotState::Listening);
    }

    #[test]
    fn test_invalid_state_transitions() {
        let mut sm = SlotStateMachine::new(SlotRole::Downstream);

        // Cannot activate or close while listening
        assert!(sm.activate().is_err());
        assert!(sm.close().is_err());
        assert!(sm.relisten().is_err());

        sm.accept(peer()).unwrap();
        // Only one peer at a time
        assert!(sm.accept(peer()).is_err());
    }

    #[test]
    fn test_close_before_activation() {
        let mut sm = SlotStateMachine::new(SlotRole::Downstream);
        sm.accept(peer()).unwrap();
        assert!(sm.close().is_ok());
        assert!(sm.relisten().is_ok());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(SlotRole::Upstream.to_string(), "upstream");
        assert_eq!(SlotRole::Downstream.to_string(), "downstream");
    }
}
