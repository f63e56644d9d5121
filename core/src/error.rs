use std::io;

use connprobe_transport::TransportError;
use thiserror::Error;

/// Any failure that ends a probe run.
///
/// A protocol mismatch is not represented here; it panics.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to build request: {0}")]
    Request(#[source] http::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}
