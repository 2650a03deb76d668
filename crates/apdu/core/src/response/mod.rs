//! APDU responses: a payload followed by a status word

pub mod error;
pub mod status;
pub mod utils;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use error::ResponseError;
use status::StatusWord;

/// Trait for APDU responses
pub trait ApduResponse: Sized {
    /// Get the response payload data
    fn payload(&self) -> &Option<Bytes>;

    /// Get the status word
    fn status(&self) -> StatusWord;

    /// Check if the response indicates success
    fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Create from raw APDU response data
    fn from_bytes(data: &Bytes) -> Result<Self, ResponseError>;
}

/// Reassembled response of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    payload: Option<Bytes>,
    status: StatusWord,
}

impl Response {
    /// Create a new response with payload and status
    pub fn new(payload: Option<Bytes>, status: impl Into<StatusWord>) -> Self {
        Self {
            payload,
            status: status.into(),
        }
    }

    /// `90 00` response
    pub const fn success(payload: Option<Bytes>) -> Self {
        Self {
            payload,
            status: status::common::SUCCESS,
        }
    }

    /// Bare status response with no payload
    pub fn error(status: impl Into<StatusWord>) -> Self {
        Self::new(None, status)
    }

    /// Parse response from raw bytes (including status word)
    pub fn from_bytes(data: &Bytes) -> Result<Self, ResponseError> {
        let (status, payload) = utils::extract_status_and_payload(data)?;
        let payload = (!payload.is_empty()).then(|| data.slice(..payload.len()));

        trace!(
            status = %status,
            payload_len = payload.as_ref().map_or(0, |p| p.len()),
            "Parsed APDU response"
        );

        Ok(Self { payload, status })
    }

    /// Payload as a byte slice, empty when the card returned none
    pub fn data(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default()
    }
}

impl ApduResponse for Response {
    fn payload(&self) -> &Option<Bytes> {
        &self.payload
    }

    fn status(&self) -> StatusWord {
        self.status
    }

    fn from_bytes(data: &Bytes) -> Result<Self, ResponseError> {
        Self::from_bytes(data)
    }
}

/// `payload || SW1 SW2`
impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        let mut buf = BytesMut::with_capacity(response.data().len() + 2);
        buf.put_slice(response.data());
        buf.put_u8(response.status.sw1);
        buf.put_u8(response.status.sw2);
        buf.freeze()
    }
}
