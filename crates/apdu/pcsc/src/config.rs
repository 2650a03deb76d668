//! Configuration options for PC/SC transport

use pcsc::{
    Disposition as PcscDisposition, Protocols as PcscProtocols, ShareMode as PcscShareMode,
};

/// Sharing mode for card connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    /// Exclusive access to the card (default)
    Exclusive,
    /// Shared access to the card
    Shared,
    /// Direct connection to the reader
    Direct,
}

impl From<ShareMode> for PcscShareMode {
    fn from(mode: ShareMode) -> Self {
        match mode {
            ShareMode::Exclusive => Self::Exclusive,
            ShareMode::Shared => Self::Shared,
            ShareMode::Direct => Self::Direct,
        }
    }
}

/// What happens to the card when the connection is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Leave the card as it is
    LeaveCard,
    /// Warm reset, clearing verified PINs (default)
    ResetCard,
    /// Power the card down
    UnpowerCard,
}

impl From<Disposition> for PcscDisposition {
    fn from(disposition: Disposition) -> Self {
        match disposition {
            Disposition::LeaveCard => Self::LeaveCard,
            Disposition::ResetCard => Self::ResetCard,
            Disposition::UnpowerCard => Self::UnpowerCard,
        }
    }
}

/// Configuration options for PC/SC transport
#[derive(Debug, Clone)]
pub struct PcscConfig {
    /// Sharing mode for card connections
    pub share_mode: ShareMode,

    /// Preferred protocols for card communication
    pub protocols: PcscProtocols,

    /// Disposition applied on disconnect
    pub disposition: Disposition,
}

impl Default for PcscConfig {
    fn default() -> Self {
        Self {
            share_mode: ShareMode::Exclusive,
            protocols: PcscProtocols::ANY,
            disposition: Disposition::ResetCard,
        }
    }
}

impl PcscConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sharing mode
    pub const fn with_share_mode(mut self, mode: ShareMode) -> Self {
        self.share_mode = mode;
        self
    }

    /// Set the preferred protocols
    pub const fn with_protocols(mut self, protocols: PcscProtocols) -> Self {
        self.protocols = protocols;
        self
    }

    /// Set the disposition applied on disconnect
    pub const fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }
}
