//! UDP server implementation.
//!
//! A single cooperative task owns the socket and the engine. Each loop
//! iteration either receives one datagram or runs one timer sweep; handlers
//! run to completion before the next poll, so no state is ever shared and
//! nothing needs a lock.

use crate::{Result, ServerError};
use rootward_proto::MAX_DATAGRAM_SIZE;
use rootward_resolver::{Engine, Transmit};
use socket2::{Domain, Socket, Type};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::{debug, info, trace};

/// How often the timer sweep runs while the socket is quiet.
///
/// Bounded so retransmissions and failures never lag a received datagram by
/// more than this.
const SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// UDP DNS server.
pub struct UdpServer {
    socket: UdpSocket,
    engine: Engine,
    local_addr: SocketAddr,
}

impl UdpServer {
    /// Binds a server to the given address.
    ///
    /// Port 0 asks the operating system for a free port; use
    /// [`local_addr`](Self::local_addr) to learn which.
    pub async fn bind(addr: SocketAddr, engine: Engine) -> Result<Self> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, None).map_err(ServerError::Bind)?;
        socket.set_reuse_address(true).map_err(ServerError::Bind)?;
        socket.set_nonblocking(true).map_err(ServerError::Bind)?;
        socket.bind(&addr.into()).map_err(ServerError::Bind)?;

        let std_socket: std::net::UdpSocket = socket.into();
        let socket = UdpSocket::from_std(std_socket).map_err(ServerError::Bind)?;
        let local_addr = socket.local_addr().map_err(ServerError::Bind)?;

        info!(addr = %local_addr, "UDP server listening");

        Ok(Self {
            socket,
            engine,
            local_addr,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the event loop until the task is cancelled.
    pub async fn run(mut self) -> Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut tick = tokio::time::interval(SWEEP_INTERVAL);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            let outbound = tokio::select! {
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, src)) => {
                            trace!(%src, len, "datagram received");
                            self.engine.handle_datagram(src, &buf[..len], Instant::now())
                        }
                        Err(e) => {
                            // Transient receive errors (e.g. ICMP port
                            // unreachable surfacing on the socket) must not
                            // stop the loop.
                            debug!(error = %e, "receive error");
                            Vec::new()
                        }
                    }
                }
                _ = tick.tick() => {
                    self.engine.sweep(Instant::now())
                }
            };

            self.send_all(outbound).await;
        }
    }

    /// Sends a batch of engine output.
    async fn send_all(&self, transmits: Vec<Transmit>) {
        for transmit in transmits {
            let wire = transmit.message.to_wire();
            if let Err(e) = self.socket.send_to(&wire, transmit.dest).await {
                debug!(dest = %transmit.dest, error = %e, "send failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootward_resolver::ResolverConfig;
    use rootward_zone::ZoneStore;
    use std::net::Ipv4Addr;

    fn test_engine(dir: &std::path::Path) -> Engine {
        let config = ResolverConfig {
            log_dir: dir.to_path_buf(),
            ..ResolverConfig::default()
        };
        Engine::new(ZoneStore::new(Vec::new()), Ipv4Addr::new(127, 0, 0, 1), config)
    }

    #[tokio::test]
    async fn test_bind_os_assigned_port() {
        let dir = tempfile::tempdir().unwrap();
        let server = UdpServer::bind("0.0.0.0:0".parse().unwrap(), test_engine(dir.path()))
            .await
            .unwrap();

        assert!(server.local_addr().port() > 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_error() {
        let dir = tempfile::tempdir().unwrap();

        // Hold a port with a plain socket, then try to bind the server to it.
        let taken = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        let result = UdpServer::bind(addr, test_engine(dir.path())).await;
        assert!(matches!(result, Err(ServerError::Bind(_))));
    }
}
