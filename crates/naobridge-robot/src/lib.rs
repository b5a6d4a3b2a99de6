pub mod backend;
mod client;

pub use backend::{RobotBackend, SimulatedRobot};
pub use client::RobotClient;
