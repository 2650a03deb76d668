//! PC/SC transport implementation for APDU operations
//!
//! This crate provides an implementation of the `CardTransport` trait from
//! `smartcard-apdu-core` using the PC/SC API for communication with smart cards.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use smartcard_apdu_core::prelude::*;
//! use smartcard_transport_pcsc::PcscDeviceManager;
//!
//! let manager = PcscDeviceManager::new()?;
//!
//! let Some(reader) = manager.list_readers()?.into_iter().find(|r| r.has_card()) else {
//!     println!("No card found");
//!     return Ok(());
//! };
//!
//! let mut transport = manager.open_reader(reader.name())?;
//! let select = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, vec![0xD2, 0x76, 0x00, 0x01, 0x24, 0x01]);
//! let response = GetResponseProcessor::new(16, 0x00).process_command(&select, &mut transport)?;
//! println!("Status: {}", response.status());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod reader;
mod transport;

pub use config::{Disposition, PcscConfig, ShareMode};
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::PcscTransport;

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
