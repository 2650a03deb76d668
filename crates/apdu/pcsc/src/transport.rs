//! PC/SC transport implementation

use std::fmt;

use bytes::Bytes;
use pcsc::{Attribute, Card};
use smartcard_apdu_core::{CardTransport, TransportError};
use tracing::{debug, warn};

use crate::{config::PcscConfig, error::PcscError};

/// Transport over one PC/SC card connection
///
/// The connection is established when the transport is created and released
/// with the configured disposition when it is dropped.
pub struct PcscTransport {
    /// Card connection, `None` after removal or reset
    card: Option<Card>,
    reader_name: String,
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    pub(crate) fn new(card: Card, reader_name: String, config: PcscConfig) -> Self {
        Self {
            card: Some(card),
            reader_name,
            config,
        }
    }

    /// Reader name
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    fn card(&self) -> Result<&Card, PcscError> {
        self.card
            .as_ref()
            .ok_or_else(|| PcscError::NoCard(self.reader_name.clone()))
    }

    fn transmit_command(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let mut response_buffer = [0u8; pcsc::MAX_BUFFER_SIZE];

        let result = self.card()?.transmit(command, &mut response_buffer);
        match result {
            Ok(response) => Ok(Bytes::copy_from_slice(response)),
            Err(e) => {
                let err = PcscError::transmit(e);
                if matches!(err, PcscError::CardRemoved | PcscError::CardReset) {
                    debug!(reader = %self.reader_name, error = %err, "Card connection lost");
                    self.card = None;
                }
                Err(err)
            }
        }
    }
}

impl CardTransport for PcscTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command).map_err(TransportError::from)
    }

    fn atr(&self) -> Result<Bytes, TransportError> {
        let atr = self
            .card()?
            .get_attribute_owned(Attribute::AtrString)
            .map_err(PcscError::from)?;
        Ok(Bytes::from(atr))
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        if let Some(card) = self.card.take() {
            debug!(reader = %self.reader_name, "Disconnecting card");
            if let Err((_, e)) = card.disconnect(self.config.disposition.into()) {
                warn!(reader = %self.reader_name, error = %e, "Failed to disconnect card");
            }
        }
    }
}
