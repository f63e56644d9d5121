//! TLS and ALPN setup for the requested protocol version.
//!
//! # Negotiation Matrix
//!
//! | Version | Pinned transport | Pooled transport |
//! |---------|------------------|------------------|
//! | HTTP/1  | no ALPN, HTTP/2 client connection | `http1_only` |
//! | HTTP/2  | ALPN `h2` only, HTTP/2 client connection | ALPN `h2, http/1.1`, may fall back |
//!
//! The pinned transport always binds an HTTP/2 client connection: the HTTP/2
//! preface is sent whether or not the server confirmed `h2`. Under HTTP/1 it
//! simply stops advertising `h2`, so a server that answers over HTTP/2 anyway
//! trips the driver's protocol check. On the pooled transport negotiation is
//! opportunistic, and the same check is what surfaces a fallback.
//!
//! Certificate verification is disabled for both transports. Handshake
//! signatures are still checked against the provider's algorithms.

use std::sync::Arc;

use connprobe_types::ProtocolVersion;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, aws_lc_rs, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};

use crate::error::TransportError;

pub(crate) const ALPN_H2: &[u8] = b"h2";

/// ALPN protocols advertised by the pinned transport. Empty for HTTP/1.
pub(crate) fn alpn_protocols(protocol: ProtocolVersion) -> Vec<Vec<u8>> {
    match protocol {
        ProtocolVersion::Http1 => Vec::new(),
        ProtocolVersion::Http2 => vec![ALPN_H2.to_vec()],
    }
}

/// Client TLS configuration for the pinned transport.
pub(crate) fn client_config(protocol: ProtocolVersion) -> Result<Arc<ClientConfig>, TransportError> {
    let provider = Arc::new(aws_lc_rs::default_provider());
    let mut config = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(TransportError::TlsConfig)?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new(provider)))
        .with_no_client_auth();
    config.alpn_protocols = alpn_protocols(protocol);
    Ok(Arc::new(config))
}

/// TLS server name for `host`. IP literals become IP server names (no SNI).
pub(crate) fn server_name(host: &str) -> Result<ServerName<'static>, TransportError> {
    ServerName::try_from(host)
        .map(|name| name.to_owned())
        .map_err(|source| TransportError::ServerName {
            host: host.to_string(),
            source,
        })
}

/// Compare the ALPN outcome with what the pinned transport advertised.
///
/// Returns `true` when the server confirmed `h2` under HTTP/2, or selected
/// nothing under HTTP/1. A mismatch is only logged: the pinned transport
/// speaks HTTP/2 regardless.
pub(crate) fn confirm_alpn(protocol: ProtocolVersion, negotiated: Option<&[u8]>) -> bool {
    match (protocol, negotiated) {
        (ProtocolVersion::Http2, Some(alpn)) if alpn == ALPN_H2 => true,
        (ProtocolVersion::Http1, None) => true,
        (ProtocolVersion::Http2, None) => {
            tracing::warn!("Server did not confirm h2; sending the HTTP/2 preface anyway");
            false
        }
        (_, Some(alpn)) => {
            tracing::warn!(
                negotiated = %String::from_utf8_lossy(alpn),
                "Server selected an unexpected ALPN protocol"
            );
            false
        }
    }
}

/// Accepts any server certificate while still verifying handshake signatures.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl AcceptAnyServerCert {
    fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
