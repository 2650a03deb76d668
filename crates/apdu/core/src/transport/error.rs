//! Error types for card transports

/// Errors raised by a transport while talking to a reader or card
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The smart card service is not running or cannot be reached
    #[error("Smart card service unavailable")]
    ServiceUnavailable,

    /// The named reader does not exist
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// The reader exists but holds no card
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// Another party holds the card
    #[error("Card in reader {0} is in use")]
    Busy(String),

    /// The card was removed while connected
    #[error("Card removed")]
    CardRemoved,

    /// The card was reset by another party
    #[error("Card reset")]
    CardReset,

    /// Connecting to the card failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transmitting a command failed
    #[error("Transmission error: {0}")]
    Transmission(String),

    /// The operation timed out
    #[error("Timeout")]
    Timeout,

    /// Other transport failure
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether this error means the card is no longer reachable
    pub const fn is_card_gone(&self) -> bool {
        matches!(self, Self::CardRemoved | Self::NoCard(_))
    }
}
