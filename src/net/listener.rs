//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind the configured address and port before the server starts
//! - Report the bound address for readiness handoff
//! - Hand a non-blocking std socket to the TLS server
//!
//! # Design Decisions
//! - Binding is synchronous and separate from serving, so a bind failure is
//!   known before anything waits on the server
//! - No retry: a bind failure is fatal

use std::net::{IpAddr, SocketAddr, TcpListener};

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind { addr, source } => {
                write!(f, "Failed to bind {}: {}", addr, source)
            }
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Bind { source, .. } => Some(source),
        }
    }
}

/// A bound, not yet serving, TCP socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind `ip:port`. Port 0 picks an ephemeral port.
    pub fn bind(ip: IpAddr, port: u16) -> Result<Self, ListenerError> {
        let addr = SocketAddr::new(ip, port);
        let bind_error = |source| ListenerError::Bind { addr, source };

        let inner = TcpListener::bind(addr).map_err(bind_error)?;
        inner.set_nonblocking(true).map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn into_std(self) -> TcpListener {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn binds_ephemeral_port() {
        let listener = Listener::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[test]
    fn occupied_port_is_bind_error() {
        let first = Listener::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let port = first.local_addr().port();

        let err = Listener::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap_err();
        assert!(matches!(err, ListenerError::Bind { addr, .. } if addr.port() == port));
        assert!(err.to_string().starts_with("Failed to bind 127.0.0.1:"));
    }
}
