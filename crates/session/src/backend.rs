//! Platform reader backends

use std::fmt;

use smartcard_apdu_core::{CardTransport, TransportError};

use crate::types::CardId;

/// Reader subsystem a [`CardManager`](crate::CardManager) discovers and connects cards through
pub trait CardBackend: fmt::Debug + Send + Sync {
    /// Transport returned for a connected card
    type Transport: CardTransport + 'static;

    /// Ids of the readers that currently hold a card
    ///
    /// Must not connect to any card.
    fn list_card_ids(&self) -> Result<Vec<CardId>, TransportError>;

    /// Connect exclusively to the card under `id`
    fn connect(&self, id: &CardId) -> Result<Self::Transport, TransportError>;
}
