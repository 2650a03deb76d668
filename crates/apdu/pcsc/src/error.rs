//! Error types for PC/SC transport

use smartcard_apdu_core::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// Error reported by the PC/SC subsystem
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// The PC/SC service is not running
    #[error("PC/SC service unavailable")]
    ServiceUnavailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// Another connection holds the card
    #[error("Card in reader {0} is held by another connection")]
    Busy(String),

    /// Connecting to the reader failed
    #[error("Failed to connect to reader {reader}: {source}")]
    Connect {
        /// Reader name
        reader: String,
        /// Underlying PC/SC error
        source: pcsc::Error,
    },

    /// Card was reset
    #[error("Card was reset")]
    CardReset,

    /// Card was removed
    #[error("Card was removed")]
    CardRemoved,
}

impl PcscError {
    /// Classify an error returned by the context itself
    pub(crate) fn context(err: pcsc::Error) -> Self {
        match err {
            pcsc::Error::NoService | pcsc::Error::ServiceStopped => Self::ServiceUnavailable,
            other => Self::Pcsc(other),
        }
    }

    /// Classify an error returned while connecting to `reader`
    pub(crate) fn connect(reader: &str, err: pcsc::Error) -> Self {
        match err {
            pcsc::Error::NoService | pcsc::Error::ServiceStopped => Self::ServiceUnavailable,
            pcsc::Error::UnknownReader | pcsc::Error::ReaderUnavailable => {
                Self::ReaderNotFound(reader.to_string())
            }
            pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard => Self::NoCard(reader.to_string()),
            pcsc::Error::SharingViolation => Self::Busy(reader.to_string()),
            source => Self::Connect {
                reader: reader.to_string(),
                source,
            },
        }
    }

    /// Classify an error returned while transmitting
    pub(crate) fn transmit(err: pcsc::Error) -> Self {
        match err {
            // An unplugged reader takes its card with it
            pcsc::Error::RemovedCard
            | pcsc::Error::NoSmartcard
            | pcsc::Error::ReaderUnavailable
            | pcsc::Error::UnknownReader => Self::CardRemoved,
            pcsc::Error::ResetCard => Self::CardReset,
            pcsc::Error::NoService | pcsc::Error::ServiceStopped => Self::ServiceUnavailable,
            other => Self::Pcsc(other),
        }
    }
}

impl From<PcscError> for TransportError {
    fn from(err: PcscError) -> Self {
        match err {
            PcscError::Pcsc(pcsc::Error::Timeout) => Self::Timeout,
            PcscError::Pcsc(e) => Self::Transmission(e.to_string()),
            PcscError::ServiceUnavailable => Self::ServiceUnavailable,
            PcscError::ReaderNotFound(reader) => Self::ReaderNotFound(reader),
            PcscError::NoCard(reader) => Self::NoCard(reader),
            PcscError::Busy(reader) => Self::Busy(reader),
            e @ PcscError::Connect { .. } => Self::Connection(e.to_string()),
            PcscError::CardReset => Self::CardReset,
            PcscError::CardRemoved => Self::CardRemoved,
        }
    }
}
