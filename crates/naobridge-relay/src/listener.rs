use naobridge_core::{BridgeError, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, ToSocketAddrs};
use tokio::net::TcpListener;

/// Bind a single-peer listener on `addr` (`host:port`).
///
/// SO_REUSEADDR is set so a restarted relay can rebind while old
/// connections linger in TIME_WAIT; the backlog is 1 since each slot serves
/// one peer at a time.
pub fn bind(addr: &str) -> Result<TcpListener> {
    let bind_error = |source: std::io::Error| BridgeError::Bind {
        addr: addr.to_string(),
        source,
    };

    let sock_addr: SocketAddr = addr
        .to_socket_addrs()
        .map_err(bind_error)?
        .next()
        .ok_or_else(|| {
            bind_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "address resolved to nothing",
            ))
        })?;

    let socket = Socket::new(Domain::for_address(sock_addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_error)?;
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.bind(&sock_addr.into()).map_err(bind_error)?;
    socket.listen(1).map_err(bind_error)?;
    socket.set_nonblocking(true).map_err(bind_error)?;

    TcpListener::from_std(socket.into()).map_err(bind_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = bind("127.0.0.1:0").unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_bind_error() {
        let first = bind("127.0.0.1:0").unwrap();
        let taken = first.local_addr().unwrap().to_string();

        match bind(&taken) {
            Err(BridgeError::Bind { addr, .. }) => assert_eq!(addr, taken),
            other => panic!("Expected Bind error, got {:?}", other.map(|_| ())),
        }
    }
}
