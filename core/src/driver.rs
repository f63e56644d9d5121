//! Issues one probe request and measures the response.

use std::io::Write;
use std::time::Instant;

use bytes::Bytes;
use connprobe_transport::Requester;
use connprobe_types::{ProtocolVersion, RequestOutcome, RunConfig};
use http::header::USER_AGENT;
use http::{Method, Request, Version};
use http_body_util::Empty;

use crate::error::ProbeError;

/// Fixed `user-agent` sent with every probe request.
pub const PROBE_USER_AGENT: &str = "connprobe";

/// Build `GET https://{host}{path}` with an empty body.
pub fn build_request(config: &RunConfig) -> Result<Request<Empty<Bytes>>, ProbeError> {
    Request::builder()
        .method(Method::GET)
        .uri(config.url())
        .header(USER_AGENT, PROBE_USER_AGENT)
        .body(Empty::new())
        .map_err(ProbeError::Request)
}

/// Major protocol version of `version`, as an integer.
#[must_use]
pub fn major_version(version: Version) -> u8 {
    match version {
        Version::HTTP_10 | Version::HTTP_11 => 1,
        Version::HTTP_2 => 2,
        Version::HTTP_3 => 3,
        _ => 0,
    }
}

/// Check the negotiated protocol against the expectation.
///
/// # Panics
///
/// Panics when the major versions differ. A mismatch means the environment
/// did not do what the probe asked for; there is nothing to report
/// downstream, so the run is aborted rather than returning an error.
pub fn assert_protocol(expected: ProtocolVersion, observed: Version) -> u8 {
    let major = major_version(observed);
    assert_eq!(major, expected.major(), "not {}", expected.major());
    major
}

/// Issue one request through `requester`, drain the body, and write the byte
/// count to `out` on its own line.
pub async fn issue<W: Write>(
    requester: &mut Requester,
    config: &RunConfig,
    out: &mut W,
) -> Result<RequestOutcome, ProbeError> {
    let request = build_request(config)?;
    let started = Instant::now();

    let response = requester.send(request).await?;
    let status = response.status();
    let version = response.version();
    let protocol_major = assert_protocol(config.protocol(), version);

    let body_bytes = response.drain().await?;
    tracing::info!(
        status = status.as_u16(),
        ?version,
        bytes = body_bytes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Response received"
    );

    writeln!(out, "{body_bytes}").map_err(ProbeError::Output)?;
    out.flush().map_err(ProbeError::Output)?;

    Ok(RequestOutcome {
        protocol_major,
        status: status.as_u16(),
        body_bytes,
    })
}
