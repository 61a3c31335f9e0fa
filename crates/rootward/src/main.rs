//! Rootward DNS Server
//!
//! A hybrid authoritative/recursive DNS server for controlled test
//! networks: zones it hosts are answered from a local zone file, everything
//! else is resolved by iterative descent from a configured root server.

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rootward_resolver::{Engine, ResolverConfig, DEFAULT_UPSTREAM_PORT};
use rootward_server::UdpServer;
use rootward_zone::ZoneStore;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

/// Rootward DNS server - authoritative for its zone, recursive for the rest
#[derive(Parser, Debug)]
#[command(name = "rootward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// IPv4 address of the root name server to seed recursion
    root_ip: Ipv4Addr,

    /// Path to the zone file served authoritatively
    zone: PathBuf,

    /// UDP port to bind (default: OS-assigned)
    #[arg(short, long, default_value_t = 0)]
    port: u16,

    /// Destination port for iterative queries (production would use 53)
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_PORT)]
    upstream_port: u16,

    /// Log level for stderr diagnostics (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

fn print_banner(cli: &Cli, zone: &ZoneStore, addr: SocketAddr) {
    let version = env!("CARGO_PKG_VERSION");

    eprintln!();
    eprintln!(
        "  {} {}",
        style("Rootward DNS").cyan().bold(),
        style(format!("v{version}")).dim()
    );
    eprintln!("  {} {}", style("Listening:").green(), addr);
    eprintln!(
        "  {} {} ({} records)",
        style("Zone:").green(),
        cli.zone.display(),
        zone.len()
    );
    eprintln!(
        "  {} {}:{}",
        style("Root:").green(),
        cli.root_ip,
        cli.upstream_port
    );
    eprintln!();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(logging::parse_log_level(&cli.log_level));

    let zone = ZoneStore::load(&cli.zone)
        .with_context(|| format!("cannot load zone file {}", cli.zone.display()))?;

    let config = ResolverConfig {
        upstream_port: cli.upstream_port,
        ..ResolverConfig::default()
    };

    let engine = Engine::new(zone.clone(), cli.root_ip, config);
    engine.query_log().clean();

    let bind_addr: SocketAddr = format!("0.0.0.0:{}", cli.port)
        .parse()
        .context("invalid bind address")?;
    let server = UdpServer::bind(bind_addr, engine)
        .await
        .context("cannot bind UDP socket")?;

    print_banner(&cli, &zone, server.local_addr());

    tokio::select! {
        result = server.run() => {
            result.context("server loop failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown requested");
        }
    }

    Ok(())
}
