//! Card discovery

use tracing::debug;

use crate::{Error, Result, backend::CardBackend, types::CardId};

/// List the ids of readers holding a card, in platform order
///
/// An empty list means no readers or no cards. No card is connected to.
pub fn list_ids<B: CardBackend>(backend: &B) -> Result<Vec<CardId>> {
    let ids = backend.list_card_ids().map_err(|e| {
        debug!(error = %e, "Card enumeration failed");
        Error::Enumeration(e)
    })?;
    debug!(count = ids.len(), "Enumerated cards");
    Ok(ids)
}
