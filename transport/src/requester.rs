//! The request-issuing capability shared by both transports.

use bytes::Bytes;
use connprobe_types::ConnectionVariant;
use http::{Request, StatusCode, Version};
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;

use crate::error::TransportError;
use crate::pinned::PinnedConnection;
use crate::pooled::PooledClient;

/// Request-issuing capability bound to one pinned connection or to a pool.
///
/// Built once per process and used strictly sequentially. Callers only ever
/// call [`Requester::send`]; the variant matters after construction only for
/// diagnostics.
pub enum Requester {
    Pinned(PinnedConnection),
    Pooled(PooledClient),
}

impl Requester {
    pub async fn send(
        &mut self,
        request: Request<Empty<Bytes>>,
    ) -> Result<ProbeResponse, TransportError> {
        match self {
            Requester::Pinned(conn) => conn.send(request).await,
            Requester::Pooled(client) => client.send(request).await,
        }
    }

    #[must_use]
    pub fn variant(&self) -> ConnectionVariant {
        match self {
            Requester::Pinned(_) => ConnectionVariant::SingleConnection,
            Requester::Pooled(_) => ConnectionVariant::PooledDefault,
        }
    }
}

enum ResponseBody {
    Pinned(Incoming),
    Pooled(reqwest::Response),
}

/// Response head plus a body that has not been read yet.
pub struct ProbeResponse {
    status: StatusCode,
    version: Version,
    body: ResponseBody,
}

impl ProbeResponse {
    pub(crate) fn pinned(response: http::Response<Incoming>) -> Self {
        let status = response.status();
        let version = response.version();
        Self {
            status,
            version,
            body: ResponseBody::Pinned(response.into_body()),
        }
    }

    pub(crate) fn pooled(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            body: ResponseBody::Pooled(response),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Protocol version the response arrived over.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Read the body to completion and return its length in bytes.
    ///
    /// Frames are counted as they arrive and discarded. Any read error fails
    /// the whole body: a partial count is never returned.
    pub async fn drain(self) -> Result<u64, TransportError> {
        let mut total: u64 = 0;
        match self.body {
            ResponseBody::Pinned(mut body) => {
                while let Some(frame) = body.frame().await {
                    let frame = frame.map_err(TransportError::Body)?;
                    if let Some(data) = frame.data_ref() {
                        total += data.len() as u64;
                    }
                }
            }
            ResponseBody::Pooled(mut response) => {
                while let Some(chunk) = response
                    .chunk()
                    .await
                    .map_err(TransportError::PooledBody)?
                {
                    total += chunk.len() as u64;
                }
            }
        }
        Ok(total)
    }
}
