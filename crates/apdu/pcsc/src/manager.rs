//! Device manager for PC/SC operations

use std::ffi::CString;
use std::fmt;

use pcsc::{Context, ReaderState, Scope, State};
use tracing::{debug, trace};

use crate::config::PcscConfig;
use crate::error::PcscError;
use crate::reader::PcscReader;
use crate::transport::PcscTransport;

/// Manager for PC/SC device operations
pub struct PcscDeviceManager {
    context: Context,
}

impl fmt::Debug for PcscDeviceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscDeviceManager").finish_non_exhaustive()
    }
}

impl PcscDeviceManager {
    /// Establish a user-scoped PC/SC context
    pub fn new() -> Result<Self, PcscError> {
        let context = Context::establish(Scope::User).map_err(PcscError::context)?;
        debug!("Established PC/SC context");
        Ok(Self { context })
    }

    /// List all card readers with their card presence
    ///
    /// No card is connected to. A system without readers yields an empty list.
    /// A failed status query is an error, never a list of empty readers.
    pub fn list_readers(&self) -> Result<Vec<PcscReader>, PcscError> {
        let names = match self.context.list_readers_owned() {
            Ok(names) => names,
            Err(pcsc::Error::NoReadersAvailable) => return Ok(Vec::new()),
            Err(e) => return Err(PcscError::context(e)),
        };

        let mut reader_states: Vec<ReaderState> = names
            .iter()
            .map(|name| ReaderState::new(name.clone(), State::UNAWARE))
            .collect();

        if reader_states.is_empty() {
            return Ok(Vec::new());
        }

        match self.context.get_status_change(None, &mut reader_states) {
            Ok(()) => {}
            // Every reader went away between the two calls
            Err(pcsc::Error::NoReadersAvailable) => return Ok(Vec::new()),
            Err(e) => {
                debug!(error = %e, "Reader status query failed");
                return Err(PcscError::context(e));
            }
        }

        let readers: Vec<PcscReader> = reader_states
            .iter()
            .map(PcscReader::from_reader_state)
            .collect();

        trace!(?readers, "Listed readers");
        Ok(readers)
    }

    /// Open a connection to a reader with the default configuration
    pub fn open_reader(&self, reader_name: &str) -> Result<PcscTransport, PcscError> {
        self.open_reader_with_config(reader_name, PcscConfig::default())
    }

    /// Open a connection to a reader with a custom configuration
    pub fn open_reader_with_config(
        &self,
        reader_name: &str,
        config: PcscConfig,
    ) -> Result<PcscTransport, PcscError> {
        let reader = CString::new(reader_name)
            .map_err(|_| PcscError::ReaderNotFound(reader_name.to_string()))?;

        let card = self
            .context
            .connect(&reader, config.share_mode.into(), config.protocols)
            .map_err(|e| PcscError::connect(reader_name, e))?;

        debug!(reader = reader_name, share_mode = ?config.share_mode, "Connected to card");
        Ok(PcscTransport::new(card, reader_name.to_string(), config))
    }
}
