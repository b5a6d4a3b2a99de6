//! I/O-free relay logic: the delivery queue, the connection-slot state
//! machine, and translation of game frames into queue/reply actions.
//! `naobridge-relay` drives these from its socket tasks.

pub mod queue;
pub mod slot;
pub mod upstream;

pub use queue::DeliveryQueue;
pub use slot::{SlotRole, SlotState, SlotStateMachine};
pub use upstream::{AckPolicy, UpstreamAction, UpstreamHandler};
