//! Shared test utilities and fixtures
//!
//! A local TLS server that serves a fixed body on every path and records each
//! accepted connection and request, so tests can assert which connection a
//! request traveled on and which protocol it used.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use connprobe_types::{ConnectionVariant, ProtocolVersion, RunConfig, TargetHost};
use http::header::USER_AGENT;
use http::{Request, Response, Version};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::{http1, http2};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use rustls::ServerConfig;
use rustls::crypto::aws_lc_rs;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

/// Application protocols the test server is willing to negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerProtocols {
    Http1Only,
    Http2Only,
    Both,
}

impl ServerProtocols {
    fn alpn(self) -> Vec<Vec<u8>> {
        match self {
            ServerProtocols::Http1Only => vec![b"http/1.1".to_vec()],
            ServerProtocols::Http2Only => vec![b"h2".to_vec()],
            ServerProtocols::Both => vec![b"h2".to_vec(), b"http/1.1".to_vec()],
        }
    }
}

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Zero-based index of the accepted connection that carried the request.
    pub connection: usize,
    pub version: Version,
    pub path: String,
    pub user_agent: Option<String>,
    pub received_at: Instant,
}

#[derive(Debug, Default)]
struct Recorder {
    connections: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Recorder {
    fn record(&self, connection: usize, request: &Request<Incoming>) {
        let recorded = RecordedRequest {
            connection,
            version: request.version(),
            path: request.uri().path().to_string(),
            user_agent: request
                .headers()
                .get(USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            received_at: Instant::now(),
        };
        self.requests.lock().unwrap().push(recorded);
    }
}

#[derive(Debug, Clone, Copy)]
struct ServerSettings {
    protocols: ServerProtocols,
    body_len: usize,
    keep_alive: bool,
}

/// TLS test server bound to an ephemeral port on 127.0.0.1.
pub struct TestServer {
    addr: SocketAddr,
    recorder: Arc<Recorder>,
    accept_loop: JoinHandle<()>,
}

impl TestServer {
    /// Start a server answering every request with `body_len` bytes.
    pub async fn start(protocols: ServerProtocols, body_len: usize) -> Self {
        Self::start_with(ServerSettings {
            protocols,
            body_len,
            keep_alive: true,
        })
        .await
    }

    /// Start a server that closes each connection after the first response,
    /// like a server with a very short idle timeout. HTTP/1.1 connections get
    /// `connection: close`; HTTP/2 connections get a graceful GOAWAY.
    pub async fn start_without_keep_alive(protocols: ServerProtocols, body_len: usize) -> Self {
        Self::start_with(ServerSettings {
            protocols,
            body_len,
            keep_alive: false,
        })
        .await
    }

    async fn start_with(settings: ServerSettings) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let acceptor = TlsAcceptor::from(server_tls_config(settings.protocols));
        let recorder = Arc::new(Recorder::default());
        let body = Bytes::from(vec![b'x'; settings.body_len]);

        let accept_loop = tokio::spawn({
            let recorder = Arc::clone(&recorder);
            async move {
                loop {
                    let Ok((tcp, _)) = listener.accept().await else {
                        return;
                    };
                    let connection = recorder.connections.fetch_add(1, Ordering::SeqCst);
                    let acceptor = acceptor.clone();
                    let recorder = Arc::clone(&recorder);
                    let body = body.clone();
                    tokio::spawn(async move {
                        serve_connection(acceptor, tcp, connection, recorder, body, settings)
                            .await;
                    });
                }
            }
        });

        Self {
            addr,
            recorder,
            accept_loop,
        }
    }

    /// `host:port` suitable for `--host`.
    pub fn host(&self) -> String {
        format!("127.0.0.1:{}", self.addr.port())
    }

    /// Number of TCP connections accepted so far.
    pub fn connections(&self) -> usize {
        self.recorder.connections.load(Ordering::SeqCst)
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.requests.lock().unwrap().clone()
    }

    /// Build a run configuration aimed at this server with path `/x`.
    pub fn config(
        &self,
        variant: ConnectionVariant,
        protocol: ProtocolVersion,
        delay: Duration,
    ) -> RunConfig {
        RunConfig::new(TargetHost::parse(&self.host()).unwrap())
            .with_path("/x")
            .unwrap()
            .with_variant(variant)
            .with_protocol(protocol)
            .with_delay(delay)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

async fn serve_connection(
    acceptor: TlsAcceptor,
    tcp: TcpStream,
    connection: usize,
    recorder: Arc<Recorder>,
    body: Bytes,
    settings: ServerSettings,
) {
    let Ok(tls) = acceptor.accept(tcp).await else {
        return;
    };
    // A client that offers no ALPN still gets HTTP/2 from an h2-only server.
    let is_h2 = match tls.get_ref().1.alpn_protocol() {
        Some(alpn) => alpn == b"h2",
        None => settings.protocols == ServerProtocols::Http2Only,
    };

    let served = Arc::new(Notify::new());
    let service = service_fn({
        let served = Arc::clone(&served);
        move |request: Request<Incoming>| {
            recorder.record(connection, &request);
            served.notify_one();
            let body = body.clone();
            async move { Ok::<_, Infallible>(Response::new(Full::new(body))) }
        }
    });

    let io = TokioIo::new(tls);
    if is_h2 {
        let conn = http2::Builder::new(TokioExecutor::new()).serve_connection(io, service);
        tokio::pin!(conn);
        if !settings.keep_alive {
            tokio::select! {
                _ = conn.as_mut() => return,
                () = served.notified() => conn.as_mut().graceful_shutdown(),
            }
        }
        let _ = conn.await;
    } else {
        let _ = http1::Builder::new()
            .keep_alive(settings.keep_alive)
            .serve_connection(io, service)
            .await;
    }
}

fn server_tls_config(protocols: ServerProtocols) -> Arc<ServerConfig> {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let key = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());
    let certs = vec![cert.cert.der().clone()];

    let mut config = ServerConfig::builder_with_provider(Arc::new(aws_lc_rs::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(certs, PrivateKeyDer::Pkcs8(key))
        .unwrap();
    config.alpn_protocols = protocols.alpn();
    Arc::new(config)
}

/// Run output split into the reported byte counts.
pub fn reported_counts(out: &[u8]) -> Vec<u64> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(|line| line.parse().unwrap())
        .collect()
}
