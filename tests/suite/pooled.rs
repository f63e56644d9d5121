//! Pooled (default) variant against a live TLS server

use std::time::Duration;

use connprobe_types::{ConnectionVariant, ProtocolVersion};
use http::Version;

use crate::common::{ServerProtocols, TestServer, reported_counts};

#[tokio::test]
async fn http2_reuses_the_pooled_connection() {
    let server = TestServer::start(ServerProtocols::Both, 512).await;
    let config = server.config(
        ConnectionVariant::PooledDefault,
        ProtocolVersion::Http2,
        Duration::from_millis(50),
    );

    let mut out = Vec::new();
    let report = connprobe_core::run(&config, &mut out).await.unwrap();

    assert_eq!(reported_counts(&out), vec![512, 512]);
    assert_eq!(report.first.protocol_major, 2);
    assert_eq!(server.connections(), 1);
    assert!(
        server
            .requests()
            .iter()
            .all(|r| r.version == Version::HTTP_2)
    );
}

#[tokio::test]
async fn http1_keeps_the_idle_connection_across_the_delay() {
    let server = TestServer::start(ServerProtocols::Both, 512).await;
    let config = server.config(
        ConnectionVariant::PooledDefault,
        ProtocolVersion::Http1,
        Duration::from_millis(200),
    );

    let mut out = Vec::new();
    let report = connprobe_core::run(&config, &mut out).await.unwrap();

    assert_eq!(out, b"512\n512\n");
    assert_eq!(report.second.protocol_major, 1);
    assert_eq!(server.connections(), 1);
    assert!(
        server
            .requests()
            .iter()
            .all(|r| r.version == Version::HTTP_11)
    );
}

#[tokio::test]
async fn http1_redials_when_the_server_closes() {
    let server = TestServer::start_without_keep_alive(ServerProtocols::Http1Only, 512).await;
    let config = server.config(
        ConnectionVariant::PooledDefault,
        ProtocolVersion::Http1,
        Duration::from_millis(200),
    );

    let mut out = Vec::new();
    connprobe_core::run(&config, &mut out).await.unwrap();

    assert_eq!(out, b"512\n512\n");
    assert_eq!(server.connections(), 2);
    let requests = server.requests();
    assert_eq!(requests[0].connection, 0);
    assert_eq!(requests[1].connection, 1);
}

#[tokio::test]
#[should_panic(expected = "not 2")]
async fn http2_expectation_panics_on_http1_fallback() {
    let server = TestServer::start(ServerProtocols::Http1Only, 512).await;
    let config = server.config(
        ConnectionVariant::PooledDefault,
        ProtocolVersion::Http2,
        Duration::ZERO,
    );

    let mut out = Vec::new();
    let _ = connprobe_core::run(&config, &mut out).await;
}
