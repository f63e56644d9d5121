//! Target host parsing.
//!
//! The operator supplies either a bare hostname (`example.com`), a `host:port`
//! pair, or an IPv6 literal with or without brackets. The value is parsed as
//! the authority of an `https://` URL, so the default port and IPv6 bracket
//! rules are the URL ones. The transport needs the split host and port for DNS
//! and TLS server names; the request URL needs the authority.

use std::fmt;
use std::net::Ipv6Addr;

use url::{Host, ParseError, Url};

use crate::config::ConfigError;

/// Port used when the target does not name one. Every probe speaks TLS.
pub const DEFAULT_PORT: u16 = 443;

/// A validated probe target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHost {
    /// Authority as it appears in the request URL.
    authority: String,
    host: String,
    port: u16,
}

impl TargetHost {
    /// Parse an operator-supplied host string.
    ///
    /// Accepted forms:
    /// - `example.com`, `10.0.0.1` (port defaults to 443)
    /// - `example.com:8443`, `10.0.0.1:8443`
    /// - `[::1]`, `[::1]:8443`
    /// - `::1` (bare IPv6 literal, port defaults to 443)
    ///
    /// Anything beyond an authority (path, query, credentials) is rejected.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::MissingHost);
        }

        let authority = if raw.parse::<Ipv6Addr>().is_ok() {
            format!("[{raw}]")
        } else {
            raw.to_string()
        };

        let url = Url::parse(&format!("https://{authority}")).map_err(|e| match e {
            ParseError::InvalidPort => ConfigError::InvalidPort(raw.to_string()),
            _ => ConfigError::InvalidHost(raw.to_string()),
        })?;

        if url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
            || !url.username().is_empty()
            || url.password().is_some()
        {
            return Err(ConfigError::InvalidHost(raw.to_string()));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(ConfigError::InvalidHost(raw.to_string())),
        };
        let port = url.port_or_known_default().unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(ConfigError::InvalidPort(raw.to_string()));
        }

        // `host_str` keeps IPv6 brackets; `port` is `None` when it is the default.
        let host_str = url.host_str().unwrap_or(&host);
        let authority = match url.port() {
            Some(port) => format!("{host_str}:{port}"),
            None => host_str.to_string(),
        };

        Ok(Self {
            authority,
            host,
            port,
        })
    }

    /// Authority component for the request URL. Bare IPv6 literals gain
    /// brackets and an explicit default port is dropped.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Hostname or IP literal without brackets or port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for TargetHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
