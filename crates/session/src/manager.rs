//! Card discovery and exclusive session management

use std::{collections::HashSet, fmt, sync::Arc};

use parking_lot::Mutex;
use smartcard_apdu_core::TransportError;
use tracing::{debug, instrument};

use crate::{
    Error, Result,
    backend::CardBackend,
    config::SessionConfig,
    enumerator,
    session::Session,
    types::CardId,
};

/// In-process record of the ids that have a live session
#[derive(Debug, Clone, Default)]
struct LeaseRegistry(Arc<Mutex<HashSet<CardId>>>);

impl LeaseRegistry {
    fn acquire(&self, id: &CardId) -> Option<Lease> {
        self.0.lock().insert(id.clone()).then(|| Lease {
            id: id.clone(),
            registry: self.clone(),
        })
    }

    fn is_held(&self, id: &CardId) -> bool {
        self.0.lock().contains(id)
    }
}

/// Exclusive claim on one card id, released on drop
pub(crate) struct Lease {
    id: CardId,
    registry: LeaseRegistry,
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lease").field(&self.id).finish()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.registry.0.lock().remove(&self.id);
        debug!(card = %self.id, "Released card lease");
    }
}

/// Entry point: lists cards and opens exclusive sessions on them
///
/// At most one [`Session`] per card id is live at a time, across all
/// threads sharing this manager.
#[derive(Debug)]
pub struct CardManager<B: CardBackend> {
    backend: B,
    leases: LeaseRegistry,
    config: SessionConfig,
}

impl<B: CardBackend> CardManager<B> {
    /// Manager over `backend` with the default session configuration
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    /// Manager over `backend` with a custom session configuration
    pub fn with_config(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            leases: LeaseRegistry::default(),
            config,
        }
    }

    /// Session configuration
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reader backend
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Ids of the readers currently holding a card
    pub fn list_ids(&self) -> Result<Vec<CardId>> {
        enumerator::list_ids(&self.backend)
    }

    /// Whether a live session holds `id`
    pub fn is_busy(&self, id: &CardId) -> bool {
        self.leases.is_held(id)
    }

    /// Open an exclusive session on the card under `id`
    ///
    /// The session is returned only after the OpenPGP application answered
    /// SELECT and its application related data was read.
    #[instrument(skip(self, id), fields(card = %id))]
    pub fn open(&self, id: &CardId) -> Result<Session<B::Transport>> {
        let lease = self
            .leases
            .acquire(id)
            .ok_or_else(|| Error::CardBusy(id.clone()))?;

        let transport = self.backend.connect(id).map_err(|e| {
            debug!(error = %e, "Connect failed");
            match e {
                TransportError::ReaderNotFound(_)
                | TransportError::NoCard(_)
                | TransportError::CardRemoved => Error::CardNotFound(id.clone()),
                TransportError::Busy(_) => Error::CardBusy(id.clone()),
                other => Error::CardCommunication(other),
            }
        })?;

        Session::open(id.clone(), transport, lease, self.config)
    }

    /// Close `session`; closing twice is a no-op
    pub fn close(&self, session: &Session<B::Transport>) {
        session.close();
    }
}

#[cfg(feature = "pcsc")]
impl CardManager<crate::pcsc::PcscBackend> {
    /// Manager over the platform PC/SC service
    pub fn establish() -> Result<Self> {
        let backend = crate::pcsc::PcscBackend::new().map_err(Error::Enumeration)?;
        Ok(Self::new(backend))
    }
}
