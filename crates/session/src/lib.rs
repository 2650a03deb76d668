//! Exclusive sessions, public key retrieval and signing against OpenPGP smart cards
//!
//! A [`CardManager`] lists the readers holding a card and opens one exclusive
//! [`Session`] per card. A session reads the card's public key and signs
//! caller-supplied digests with it. APDU framing and `61xx` response chaining
//! come from `smartcard-apdu-core`.
//!
//! ```no_run
//! # fn main() -> Result<(), smartcard_session::Error> {
//! use smartcard_session::{AlgorithmId, CardManager};
//!
//! let manager = CardManager::establish()?;
//! let Some(id) = manager.list_ids()?.into_iter().next() else {
//!     return Ok(());
//! };
//!
//! let session = manager.open(&id)?;
//! println!("{}", session.public_key()?.to_openssh()?);
//!
//! let digest = [0u8; 32];
//! let signature = session.sign(AlgorithmId::EcdsaSha256, &digest)?;
//! println!("{}", hex::encode(&*signature));
//! session.close();
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod backend;
pub mod commands;
mod config;
pub mod constants;
mod crypto;
mod enumerator;
mod error;
mod manager;
#[cfg(feature = "pcsc")]
mod pcsc;
mod session;
pub mod types;

pub use backend::CardBackend;
pub use config::SessionConfig;
pub use enumerator::list_ids;
pub use error::{Error, ProtocolError, Result};
pub use manager::CardManager;
#[cfg(feature = "pcsc")]
pub use pcsc::PcscBackend;
pub use session::{Session, SessionState};
pub use types::{
    AlgorithmAttributes, AlgorithmId, ApplicationId, CardId, Curve, KeySlot, PinStatus, PublicKey,
    Signature,
};

#[cfg(feature = "pcsc")]
pub use smartcard_transport_pcsc::{Disposition, PcscConfig, ShareMode};
