//! Network infrastructure for the controller.
//!
//! One listener, one accepted connection: the protocol admits a single
//! model per run, so [`ModelListener::accept_model`] consumes the
//! listener and no further connection can be accepted afterwards.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid bind address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),
}

/// Bound TCP listener waiting for the model to connect.
#[derive(Debug)]
pub struct ModelListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl ModelListener {
    /// Binds to `bind_address:port`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidAddress`] if the address does not parse,
    /// [`NetworkError::BindFailed`] if the socket cannot be bound.
    pub async fn bind(bind_address: &str, port: u16) -> Result<Self, NetworkError> {
        let addr: SocketAddr =
            format!("{bind_address}:{port}")
                .parse()
                .map_err(|source| NetworkError::InvalidAddress {
                    addr: format!("{bind_address}:{port}"),
                    source,
                })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| NetworkError::BindFailed { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| NetworkError::BindFailed { addr, source })?;
        info!(%local_addr, "listening for the model");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Actual bound address; differs from the requested one when the
    /// port was 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the model to connect. Consumes the listener: the
    /// protocol admits exactly one model connection per run.
    ///
    /// # Errors
    ///
    /// [`NetworkError::Accept`] if the accept call fails.
    pub async fn accept_model(self) -> Result<(TcpStream, SocketAddr), NetworkError> {
        let (stream, peer) = self.listener.accept().await.map_err(NetworkError::Accept)?;
        info!(%peer, "model connected");
        Ok((stream, peer))
    }
}
