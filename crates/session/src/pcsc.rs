//! PC/SC reader backend

use smartcard_apdu_core::TransportError;
use smartcard_transport_pcsc::{PcscConfig, PcscDeviceManager, PcscTransport};
use tracing::trace;

use crate::{backend::CardBackend, types::CardId};

/// [`CardBackend`] over the platform PC/SC service
#[derive(Debug)]
pub struct PcscBackend {
    manager: PcscDeviceManager,
    config: PcscConfig,
}

impl PcscBackend {
    /// Establish a PC/SC context with the default (exclusive) configuration
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(PcscConfig::default())
    }

    /// Establish a PC/SC context with a custom connection configuration
    pub fn with_config(config: PcscConfig) -> Result<Self, TransportError> {
        Ok(Self {
            manager: PcscDeviceManager::new()?,
            config,
        })
    }

    /// Connection configuration
    pub const fn config(&self) -> &PcscConfig {
        &self.config
    }
}

impl CardBackend for PcscBackend {
    type Transport = PcscTransport;

    fn list_card_ids(&self) -> Result<Vec<CardId>, TransportError> {
        let readers = self.manager.list_readers()?;
        trace!(readers = readers.len(), "Listed PC/SC readers");
        Ok(readers
            .into_iter()
            .filter(|reader| reader.has_card())
            .map(|reader| CardId::new(reader.name()))
            .collect())
    }

    fn connect(&self, id: &CardId) -> Result<Self::Transport, TransportError> {
        Ok(self
            .manager
            .open_reader_with_config(id.as_str(), self.config.clone())?)
    }
}
