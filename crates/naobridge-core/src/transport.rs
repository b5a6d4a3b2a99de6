use tokio::io::{AsyncRead, AsyncWrite};

/// Abstract byte stream to a game or robot peer.
/// Lets the slot loops run over an in-memory duplex stream in tests.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Transport for T {}
