//! # Rootward Resolver
//!
//! The recursive resolution state machine. This crate is sans-I/O: the
//! [`Engine`] consumes datagrams and clock readings and returns the
//! datagrams to send, which keeps the whole state machine testable without a
//! network.
//!
//! ## Structure
//!
//! - [`table`]: outstanding queries keyed by iterative transaction id,
//!   plus the retired-id set that silences late duplicates
//! - [`query`]: per-query state holding the original client request, the
//!   CNAME chain, the active zone, and retransmission bookkeeping
//! - [`bailiwick`]: drops out-of-zone records from untrusted responses
//! - [`compose`]: builds answer/authority/additional sections from a
//!   record pool
//! - [`qlog`]: per-query trace files
//! - [`engine`]: classification, iterative descent, CNAME chasing, and the
//!   retransmit/failure sweep

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bailiwick;
pub mod compose;
pub mod engine;
pub mod qlog;
pub mod query;
pub mod table;

pub use engine::{Engine, Transmit};
pub use qlog::QueryLog;

use std::path::PathBuf;
use std::time::Duration;

/// Default port iterative queries are sent to on remote servers.
///
/// 60053 is the test-network convention; production deployments use 53.
pub const DEFAULT_UPSTREAM_PORT: u16 = 60053;

/// Resolver tunables.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Destination port for iterative queries.
    pub upstream_port: u16,

    /// How long to wait for an upstream response before resending.
    pub retransmit_interval: Duration,

    /// How many retransmissions to attempt before giving up.
    ///
    /// A query sends at most `attempt_budget + 1` datagrams per iterative
    /// step (the initial send plus the retransmissions).
    pub attempt_budget: u32,

    /// Directory per-query trace files are written to.
    pub log_dir: PathBuf,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            upstream_port: DEFAULT_UPSTREAM_PORT,
            retransmit_interval: Duration::from_secs(1),
            attempt_budget: 6,
            log_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ResolverConfig::default();

        assert_eq!(config.upstream_port, 60053);
        assert_eq!(config.retransmit_interval, Duration::from_secs(1));
        assert_eq!(config.attempt_budget, 6);
    }
}
