//! Transports for connprobe.
//!
//! # Architecture
//!
//! [`build`] turns a [`RunConfig`] into a [`Requester`], the only
//! request-issuing capability the rest of the probe sees:
//!
//! | Variant | Requester | Connections |
//! |---------|-----------|-------------|
//! | `single-conn` | [`Requester::Pinned`] | exactly one HTTP/2 connection, dialed here, never replaced |
//! | `default` | [`Requester::Pooled`] | managed by `reqwest`'s pool |
//!
//! Protocol negotiation (the ALPN list per version) lives in the
//! private `negotiate` module and is applied while the transport is built.
//! Certificate verification is disabled for both variants.
//!
//! # Error Handling
//!
//! Every failure is a [`TransportError`]. Nothing is retried; a dropped
//! connection on the pinned transport surfaces on the next request.

mod error;
mod negotiate;
mod pinned;
mod pooled;
mod requester;

use connprobe_types::{ConnectionVariant, RunConfig};

pub use error::TransportError;
pub use pinned::PinnedConnection;
pub use pooled::PooledClient;
pub use requester::{ProbeResponse, Requester};

/// Build the requester described by `config`.
///
/// The single-connection variant dials and handshakes here, so connectivity
/// failures surface before any request is issued. The pooled variant connects
/// lazily on the first request.
pub async fn build(config: &RunConfig) -> Result<Requester, TransportError> {
    match config.variant() {
        ConnectionVariant::SingleConnection => {
            tracing::info!(
                target_host = %config.target(),
                protocol = %config.protocol(),
                "Setting up single-connection transport"
            );
            let conn = PinnedConnection::connect(config.target(), config.protocol()).await?;
            Ok(Requester::Pinned(conn))
        }
        ConnectionVariant::PooledDefault => {
            tracing::info!(
                target_host = %config.target(),
                protocol = %config.protocol(),
                max_idle_per_host = pooled::POOL_MAX_IDLE_PER_HOST,
                "Setting up pooled transport"
            );
            Ok(Requester::Pooled(PooledClient::new(config.protocol())?))
        }
    }
}
