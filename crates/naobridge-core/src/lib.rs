// Error types module
pub mod error;

// Game events, robot command model and wire codecs
pub mod event;
pub mod command;
pub mod codec;

// Byte-stream abstraction over sockets
pub mod transport;

// Re-export commonly used types
pub use codec::{
    CommandCodec, DecodedCommand, JsonCodec, LegacyCodec, WireFormat, DISCONNECT_NOTICE,
    READY_NOTICE,
};
pub use command::{Command, Message, Turn};
pub use event::{GameAck, GameEvent};
pub use error::{BridgeError, ErrorSeverity, Result};
pub use transport::Transport;
