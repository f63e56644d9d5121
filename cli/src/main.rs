//! connprobe CLI - binary entry point.
//!
//! Issues two HTTPS GET requests to `--host`, separated by `--sleep` seconds,
//! over a transport whose connection reuse is controlled by `--variant`:
//!
//! - `single-conn`: both requests go over one explicitly dialed TLS connection,
//!   always spoken as HTTP/2 (`--http-version 1` only stops advertising `h2`)
//! - `default`: a pooled client decides which connection carries each request
//!
//! Each response body's byte count is printed to stdout, one per line. Log
//! lines go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=h2=debug,info`) to see
//! the protocol internals of the underlying HTTP stack.
//!
//! # Exit Status
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Both requests completed | 0 |
//! | Configuration, connectivity or request error | 1 |
//! | Negotiated protocol differs from `--http-version` | 101 (panic) |

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use connprobe_types::{
    ConfigError, ConnectionVariant, DEFAULT_DELAY_SECS, DEFAULT_PATH, ProtocolVersion, RunConfig,
    TargetHost,
};

#[derive(Debug, Parser)]
#[command(name = "connprobe")]
#[command(about = "Probe HTTP connection reuse and protocol negotiation across an idle gap")]
struct Cli {
    /// Hostname to hit, optionally with a port
    #[arg(long, default_value = "")]
    host: String,
    /// Path to hit on the server
    #[arg(long, default_value = DEFAULT_PATH)]
    path: String,
    /// Transport to use: single-conn or default
    #[arg(long, default_value = "single-conn")]
    variant: String,
    /// HTTP version to use: 1 or 2
    #[arg(long = "http-version", default_value = "2")]
    http_version: String,
    /// Seconds to sleep between the two requests
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    sleep: u64,
}

impl Cli {
    /// Validate flags into a [`RunConfig`]. The host is checked first, then the
    /// protocol version, then the variant.
    fn into_config(self) -> Result<RunConfig, ConfigError> {
        let target = TargetHost::parse(&self.host)?;
        let protocol = ProtocolVersion::parse(&self.http_version)?;
        let variant = ConnectionVariant::parse(&self.variant)?;

        Ok(RunConfig::new(target)
            .with_path(self.path)?
            .with_variant(variant)
            .with_protocol(protocol)
            .with_delay(Duration::from_secs(self.sleep)))
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries only the byte counts
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let config = Cli::parse()
        .into_config()
        .context("invalid configuration")?;

    let mut out = io::stdout();
    let report = connprobe_core::run(&config, &mut out)
        .await
        .context("probe failed")?;

    tracing::debug!(
        first_bytes = report.first.body_bytes,
        second_bytes = report.second.body_bytes,
        idle_gap = ?report.idle_gap,
        "Run complete"
    );

    Ok(())
}
