/// Result of one probe request.
///
/// Produced once per request and reported; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    /// Major version of the negotiated protocol (1 or 2).
    pub protocol_major: u8,
    /// HTTP status code of the response.
    pub status: u16,
    /// Number of body bytes read to completion.
    pub body_bytes: u64,
}
