use std::io;

use rustls::pki_types::InvalidDnsNameError;
use thiserror::Error;

/// Connectivity and request/response failures.
///
/// Nothing here is retried: the probe reports the first failure and stops.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve {authority}: {source}")]
    Resolve {
        authority: String,
        #[source]
        source: io::Error,
    },
    #[error("no addresses found for {authority}")]
    NoAddresses { authority: String },
    #[error("TCP connect to {authority} failed: {source}")]
    Connect {
        authority: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid TLS server name {host:?}")]
    ServerName {
        host: String,
        #[source]
        source: InvalidDnsNameError,
    },
    #[error("TLS configuration failed: {0}")]
    TlsConfig(#[source] rustls::Error),
    #[error("TLS handshake with {authority} failed: {source}")]
    Tls {
        authority: String,
        #[source]
        source: io::Error,
    },
    #[error("HTTP handshake failed: {0}")]
    Handshake(#[source] hyper::Error),
    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),
    #[error("failed to read response body: {0}")]
    Body(#[source] hyper::Error),
    #[error("failed to build pooled client: {0}")]
    PooledBuild(#[source] reqwest::Error),
    #[error("pooled request failed: {0}")]
    PooledRequest(#[source] reqwest::Error),
    #[error("failed to read pooled response body: {0}")]
    PooledBody(#[source] reqwest::Error),
}
