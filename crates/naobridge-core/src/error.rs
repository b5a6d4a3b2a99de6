use std::time::Duration;
use thiserror::Error;

/// Main error type for the game/robot bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    // ========================================
    // Protocol Errors
    // ========================================
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    // ========================================
    // Connection Errors
    // ========================================
    #[error("No acknowledgment within {0:?}")]
    AckTimeout(Duration),

    #[error("Peer closed the connection")]
    PeerClosed,

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MalformedFrame(_) | Self::UnknownCommand(_) => ErrorSeverity::Warning,
            Self::PeerClosed => ErrorSeverity::Info,
            Self::AckTimeout(_) => ErrorSeverity::Warning,
            Self::Io(_) => ErrorSeverity::Error,
            Self::Bind { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the error means the connection it happened on must be torn down.
    ///
    /// Malformed input never breaks a connection; the offending frame is
    /// dropped and the peer stays attached.
    pub fn is_connection_broken(&self) -> bool {
        matches!(self, Self::AckTimeout(_) | Self::PeerClosed | Self::Io(_))
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
