//! Run configuration.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::target::TargetHost;

/// Request path used when the operator does not supply one.
pub const DEFAULT_PATH: &str = "/image/jpeg";

/// Pause between the two requests when the operator does not supply one.
pub const DEFAULT_DELAY_SECS: u64 = 15;

/// Rejected configuration. Always raised before any network activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required --host flag")]
    MissingHost,
    #[error("invalid host {0:?}")]
    InvalidHost(String),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("invalid request path {0:?}: must start with '/'")]
    InvalidPath(String),
    #[error("unknown variant {0:?} (expected \"single-conn\" or \"default\")")]
    UnknownVariant(String),
    #[error("invalid http version: {0:?} (expected \"1\" or \"2\")")]
    UnknownHttpVersion(String),
}

// ============================================================================
// Connection Variant
// ============================================================================

/// How the transport manages connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionVariant {
    /// Every request goes over one explicitly dialed TLS connection.
    #[default]
    SingleConnection,
    /// A standard pooled client decides which connection carries each request.
    PooledDefault,
}

impl ConnectionVariant {
    /// Parse the `--variant` flag value.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "single-conn" => Ok(ConnectionVariant::SingleConnection),
            "default" => Ok(ConnectionVariant::PooledDefault),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionVariant::SingleConnection => "single-conn",
            ConnectionVariant::PooledDefault => "default",
        }
    }
}

impl fmt::Display for ConnectionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Protocol Version
// ============================================================================

/// HTTP protocol the probe expects to negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    Http1,
    #[default]
    Http2,
}

impl ProtocolVersion {
    /// Parse the `--http-version` flag value.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "1" => Ok(ProtocolVersion::Http1),
            "2" => Ok(ProtocolVersion::Http2),
            other => Err(ConfigError::UnknownHttpVersion(other.to_string())),
        }
    }

    /// Major version every response must carry.
    #[must_use]
    pub fn major(&self) -> u8 {
        match self {
            ProtocolVersion::Http1 => 1,
            ProtocolVersion::Http2 => 2,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}", self.major())
    }
}

// ============================================================================
// Run Configuration
// ============================================================================

/// Immutable configuration for one probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    target: TargetHost,
    path: String,
    variant: ConnectionVariant,
    protocol: ProtocolVersion,
    delay: Duration,
}

impl RunConfig {
    /// Create a configuration for `target` with every other setting at its default.
    #[must_use]
    pub fn new(target: TargetHost) -> Self {
        Self {
            target,
            path: DEFAULT_PATH.to_string(),
            variant: ConnectionVariant::default(),
            protocol: ProtocolVersion::default(),
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
        }
    }

    /// Set the request path. An empty path becomes `/`.
    pub fn with_path(mut self, path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.is_empty() {
            self.path = "/".to_string();
            return Ok(self);
        }
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidPath(path));
        }
        self.path = path;
        Ok(self)
    }

    pub fn with_variant(mut self, variant: ConnectionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn target(&self) -> &TargetHost {
        &self.target
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn variant(&self) -> ConnectionVariant {
        self.variant
    }

    #[must_use]
    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Full request URL, `https://{host}{path}`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://{}{}", self.target.authority(), self.path)
    }
}
