//! Session configuration

use smartcard_apdu_core::GetResponseProcessor;

use crate::types::KeySlot;

/// Configuration applied to every session a [`CardManager`](crate::CardManager) opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Key slot used for public key retrieval and signing
    pub key_slot: KeySlot,

    /// Maximum GET RESPONSE exchanges for one command
    pub max_response_chain: usize,

    /// Class byte of GET RESPONSE
    pub get_response_class: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key_slot: KeySlot::Signing,
            max_response_chain: 16,
            get_response_class: 0x00,
        }
    }
}

impl SessionConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key slot
    pub const fn with_key_slot(mut self, key_slot: KeySlot) -> Self {
        self.key_slot = key_slot;
        self
    }

    /// Set the response chain limit
    pub const fn with_max_response_chain(mut self, max_response_chain: usize) -> Self {
        self.max_response_chain = max_response_chain;
        self
    }

    /// Set the GET RESPONSE class byte
    pub const fn with_get_response_class(mut self, cla: u8) -> Self {
        self.get_response_class = cla;
        self
    }

    pub(crate) const fn processor(&self) -> GetResponseProcessor {
        GetResponseProcessor::new(self.max_response_chain, self.get_response_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.key_slot, KeySlot::Signing);
        assert_eq!(config.max_response_chain, 16);
        assert_eq!(config.get_response_class, 0x00);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_key_slot(KeySlot::Authentication)
            .with_max_response_chain(4)
            .with_get_response_class(0x80);
        assert_eq!(config.key_slot, KeySlot::Authentication);

        let processor = config.processor();
        assert_eq!(processor.max_chain, 4);
        assert_eq!(processor.cla, 0x80);
    }
}
