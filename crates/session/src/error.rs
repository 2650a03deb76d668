use smartcard_apdu_core::{CommandError, ResponseError, StatusWord, TransportError};

use crate::types::{AlgorithmId, CardId, KeySlot};

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for smart card session operations
///
/// Every variant is a distinct outcome the caller can match on. Nothing in
/// this crate retries on the caller's behalf.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reader subsystem could not be queried
    #[error("Card enumeration failed: {0}")]
    Enumeration(#[source] TransportError),

    /// No card is present under this id, or it is not an OpenPGP card
    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    /// Another session already holds the card
    #[error("Card is busy: {0}")]
    CardBusy(CardId),

    /// Transport failure; the session has been closed
    #[error("Card communication failed: {0}")]
    CardCommunication(#[source] TransportError),

    /// The card answered with something the protocol does not allow
    #[error(transparent)]
    CardProtocol(#[from] ProtocolError),

    /// The card was removed; the session has been closed
    #[error("Card removed: {0}")]
    CardRemoved(CardId),

    /// No key is provisioned in the slot
    #[error("No key available in the {0} slot")]
    KeyUnavailable(KeySlot),

    /// The digest length does not match the algorithm
    #[error("Invalid digest length for {algorithm}: expected {expected} bytes, got {actual}")]
    InvalidDigestLength {
        /// Requested algorithm
        algorithm: AlgorithmId,
        /// Digest length the algorithm requires
        expected: usize,
        /// Digest length supplied
        actual: usize,
    },

    /// The card refused to sign
    #[error("Card rejected the signing request: {status}")]
    SigningRejected {
        /// Status word returned by the card
        status: StatusWord,
    },

    /// The session is closed
    #[error("Session closed: {0}")]
    SessionClosed(CardId),

    /// The requested algorithm does not match the key in the slot
    #[error("Algorithm {algorithm} does not match the {slot} key")]
    AlgorithmMismatch {
        /// Requested algorithm
        algorithm: AlgorithmId,
        /// Slot holding the key
        slot: KeySlot,
    },

    /// The operation is not possible with this key or slot
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// The raw command bytes are not a valid short APDU
    #[error("Invalid command: {0}")]
    InvalidCommand(#[from] CommandError),

    /// The PIN length is outside what the card accepts
    #[error("Invalid PIN length: {0}")]
    InvalidPin(usize),

    /// The card rejected the PIN
    #[error("PIN rejected ({} retries left)", retries_left(.retries))]
    PinRejected {
        /// Remaining retries, if the card reported them
        retries: Option<u8>,
    },

    /// The PIN retry counter is exhausted
    #[error("PIN blocked")]
    PinBlocked,
}

/// Protocol level failures, reported as [`Error::CardProtocol`]
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The response could not be framed
    #[error("Malformed response: {0}")]
    Framing(#[from] ResponseError),

    /// The card kept signalling more data
    #[error("Response chain exceeded {0} GET RESPONSE exchanges")]
    ChainLimitExceeded(usize),

    /// A status word outside the set the command expects
    #[error("{command} returned unexpected status {status}")]
    UnexpectedStatus {
        /// Command name
        command: &'static str,
        /// Status word returned
        status: StatusWord,
    },

    /// The response payload is not what the command defines
    #[error("Malformed data: {0}")]
    MalformedData(&'static str),

    /// The response payload is not valid BER-TLV
    #[error("Invalid TLV: {0}")]
    InvalidTlv(String),
}

fn retries_left(retries: &Option<u8>) -> String {
    retries.map_or_else(|| "unknown".to_string(), |r| r.to_string())
}

impl From<ResponseError> for Error {
    fn from(error: ResponseError) -> Self {
        Self::CardProtocol(ProtocolError::Framing(error))
    }
}

impl From<iso7816_tlv::TlvError> for Error {
    fn from(error: iso7816_tlv::TlvError) -> Self {
        Self::CardProtocol(ProtocolError::InvalidTlv(error.to_string()))
    }
}

impl Error {
    /// Shorthand for [`ProtocolError::UnexpectedStatus`]
    pub(crate) const fn unexpected_status(command: &'static str, status: StatusWord) -> Self {
        Self::CardProtocol(ProtocolError::UnexpectedStatus { command, status })
    }

    /// Shorthand for [`ProtocolError::MalformedData`]
    pub(crate) const fn malformed(reason: &'static str) -> Self {
        Self::CardProtocol(ProtocolError::MalformedData(reason))
    }

    /// Whether the session is unusable after this error
    pub const fn closes_session(&self) -> bool {
        matches!(
            self,
            Self::CardCommunication(_) | Self::CardRemoved(_) | Self::SessionClosed(_)
        )
    }
}
