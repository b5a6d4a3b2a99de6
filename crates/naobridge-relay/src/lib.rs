mod downstream;
pub mod listener;
mod server;
mod slot;
mod upstream;

pub use server::{start_relay, RelayHandle};
