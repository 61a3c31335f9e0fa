//! # Rootward Server
//!
//! UDP transport for the resolver engine: one socket, one task, no locks.
//! The event loop alternates between socket readiness and a bounded timer
//! tick, handing every datagram to the engine and sending whatever the
//! engine returns.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod udp;

pub use udp::UdpServer;

use thiserror::Error;

/// Server error types.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The socket could not be bound or configured.
    #[error("bind error: {0}")]
    Bind(std::io::Error),

    /// An I/O error on the bound socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
