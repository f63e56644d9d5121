//! A transport bound to exactly one TLS connection.
//!
//! The connection is dialed once, wrapped directly in a hyper HTTP/2 client
//! connection, and never replaced. The requested protocol version only
//! changes what is advertised over ALPN.
//!
//! There is no dialer and no pool behind it: if the server drops the
//! connection during the idle gap, the next request fails instead of silently
//! reconnecting. That failure is the observation the probe exists to make.

use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use connprobe_types::{ProtocolVersion, TargetHost};
use http::Request;
use http_body_util::Empty;
use hyper::client::conn::http2;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::{TcpStream, lookup_host};
use tokio::task::JoinHandle;
use tokio_rustls::TlsConnector;

use crate::error::TransportError;
use crate::negotiate;
use crate::requester::ProbeResponse;

/// One TLS connection plus the HTTP/2 connection bound to it.
pub struct PinnedConnection {
    sender: http2::SendRequest<Empty<Bytes>>,
    /// Background task driving the hyper connection. Finishes when the
    /// connection closes.
    driver: JoinHandle<()>,
    peer: SocketAddr,
    local: SocketAddr,
    alpn: Option<Vec<u8>>,
}

impl PinnedConnection {
    /// Dial `target`, complete the TLS handshake advertising the ALPN list for
    /// `protocol`, then bind an HTTP/2 client connection to the socket.
    pub async fn connect(
        target: &TargetHost,
        protocol: ProtocolVersion,
    ) -> Result<Self, TransportError> {
        let authority = target.to_string();

        let addrs: Vec<SocketAddr> = lookup_host((target.host(), target.port()))
            .await
            .map_err(|source| TransportError::Resolve {
                authority: authority.clone(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::NoAddresses { authority });
        }

        let tcp = TcpStream::connect(addrs.as_slice())
            .await
            .map_err(|source| TransportError::Connect {
                authority: authority.clone(),
                source,
            })?;
        let peer = tcp.peer_addr().map_err(|source| TransportError::Connect {
            authority: authority.clone(),
            source,
        })?;
        let local = tcp.local_addr().map_err(|source| TransportError::Connect {
            authority: authority.clone(),
            source,
        })?;

        let connector = TlsConnector::from(negotiate::client_config(protocol)?);
        let server_name = negotiate::server_name(target.host())?;
        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|source| TransportError::Tls {
                authority: authority.clone(),
                source,
            })?;

        let alpn = tls.get_ref().1.alpn_protocol().map(<[u8]>::to_vec);
        negotiate::confirm_alpn(protocol, alpn.as_deref());

        let (sender, conn) = http2::handshake(TokioExecutor::new(), TokioIo::new(tls))
            .await
            .map_err(TransportError::Handshake)?;
        let driver = spawn_driver(conn, peer);

        tracing::info!(
            %peer,
            %local,
            alpn = %alpn.as_deref().map(String::from_utf8_lossy).unwrap_or_default(),
            "Pinned connection established"
        );

        Ok(Self {
            sender,
            driver,
            peer,
            local,
            alpn,
        })
    }

    /// Send `request` over the pinned connection. The absolute URI is kept;
    /// hyper derives `:scheme` and `:authority` from it.
    pub async fn send(
        &mut self,
        request: Request<Empty<Bytes>>,
    ) -> Result<ProbeResponse, TransportError> {
        if self.driver.is_finished() {
            tracing::warn!(peer = %self.peer, "Pinned connection already closed");
        }

        self.sender.ready().await.map_err(TransportError::Request)?;
        let response = self
            .sender
            .send_request(request)
            .await
            .map_err(TransportError::Request)?;

        Ok(ProbeResponse::pinned(response))
    }

    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// ALPN protocol the server selected, if any.
    #[must_use]
    pub fn alpn(&self) -> Option<&[u8]> {
        self.alpn.as_deref()
    }

    /// Whether the underlying connection has already shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.driver.is_finished()
    }
}

fn spawn_driver<F>(conn: F, peer: SocketAddr) -> JoinHandle<()>
where
    F: Future<Output = hyper::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match conn.await {
            Ok(()) => tracing::info!(%peer, "Pinned connection closed"),
            Err(e) => tracing::warn!(%peer, "Pinned connection failed: {e}"),
        }
    })
}
