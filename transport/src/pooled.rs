//! A transport backed by `reqwest`'s connection pool.
//!
//! Idle connections never expire on the client side. Whether the second
//! request reuses the first connection is up to the server and the network.

use std::time::Duration;

use bytes::Bytes;
use connprobe_types::ProtocolVersion;
use http::Request;
use http_body_util::Empty;
use reqwest::redirect::Policy;

use crate::error::TransportError;
use crate::requester::ProbeResponse;

/// Idle connections kept per host.
pub(crate) const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// A pooled client configured for one protocol preference.
#[derive(Debug, Clone)]
pub struct PooledClient {
    client: reqwest::Client,
}

impl PooledClient {
    /// Build the client.
    ///
    /// HTTP/2 is only attempted when `protocol` is HTTP/2, and then only
    /// through ALPN: a server without `h2` silently gets HTTP/1.1.
    pub fn new(protocol: ProtocolVersion) -> Result<Self, TransportError> {
        let builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(None::<Duration>)
            .redirect(Policy::none())
            .no_proxy();

        let builder = match protocol {
            ProtocolVersion::Http1 => builder.http1_only(),
            ProtocolVersion::Http2 => builder,
        };

        let client = builder.build().map_err(TransportError::PooledBuild)?;
        Ok(Self { client })
    }

    /// Send `request` through the pool. The empty body is not forwarded, so
    /// no `content-length` header is added to the GET.
    pub async fn send(
        &self,
        request: Request<Empty<Bytes>>,
    ) -> Result<ProbeResponse, TransportError> {
        let (parts, _body) = request.into_parts();
        let response = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .send()
            .await
            .map_err(TransportError::PooledRequest)?;
        Ok(ProbeResponse::pooled(response))
    }
}
