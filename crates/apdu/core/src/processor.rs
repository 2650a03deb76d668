//! Response chaining for short APDUs
//!
//! [`GetResponseProcessor`] sends a command and follows the card through
//! `61xx` (more data, fetched with GET RESPONSE) and `6Cxx` (wrong Le,
//! resent once with the corrected length) until a final status arrives.

use std::fmt;

use bytes::BytesMut;
use tracing::{debug, trace};

use crate::command::{ApduCommand, Command, CommandError, wipe};
use crate::response::{ApduResponse, Response};
use crate::response::error::ResponseError;
use crate::transport::{CardTransport, TransportError};

/// INS byte of GET RESPONSE
const GET_RESPONSE_INS: u8 = 0xC0;

/// Error type for command processing
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// Underlying transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid response
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The command cannot be encoded
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The card kept answering `61xx` past the configured limit
    #[error("Response chain exceeded {0} GET RESPONSE exchanges")]
    ChainLimitExceeded(usize),
}

/// GET RESPONSE command processor
#[derive(Clone, Copy)]
pub struct GetResponseProcessor {
    /// Maximum number of GET RESPONSE exchanges for one command
    pub max_chain: usize,
    /// Class byte for GET RESPONSE command
    pub cla: u8,
}

impl fmt::Debug for GetResponseProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetResponseProcessor")
            .field("max_chain", &self.max_chain)
            .field("cla", &format_args!("{:#04x}", self.cla))
            .finish()
    }
}

impl GetResponseProcessor {
    /// Create a processor with the given chain limit and GET RESPONSE class
    pub const fn new(max_chain: usize, cla: u8) -> Self {
        Self { max_chain, cla }
    }

    /// Send a command and reassemble the full response
    pub fn process_command(
        &self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, ProcessorError> {
        command.validate()?;

        let mut response = Self::send(command, transport)?;

        if let Some(le) = response.status().correct_le() {
            debug!(le, "Card requested a corrected Le, resending");
            let mut retry = command.clone().with_le(le);
            let result = Self::send(&retry, transport);
            retry.wipe_data();
            response = result?;
        }

        let mut collected = BytesMut::new();
        let mut chain_count = 0;

        while let Some(remaining) = response.status().remaining_bytes() {
            if chain_count >= self.max_chain {
                debug!(limit = self.max_chain, "Response chain limit reached");
                return Err(ProcessorError::ChainLimitExceeded(self.max_chain));
            }
            chain_count += 1;

            collected.extend_from_slice(response.data());
            trace!(remaining, chain_count, "Fetching chained response");

            let get_response =
                Command::new_with_le(self.cla, GET_RESPONSE_INS, 0x00, 0x00, remaining);
            response = Self::send(&get_response, transport)?;
        }

        if chain_count == 0 {
            return Ok(response);
        }

        collected.extend_from_slice(response.data());
        let payload = (!collected.is_empty()).then(|| collected.freeze());
        Ok(Response::new(payload, response.status()))
    }

    /// Transmit one APDU, zeroing its encoding afterwards
    fn send(
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, ProcessorError> {
        let encoded = command.to_bytes();
        let result = transport.transmit_raw(&encoded);
        wipe(encoded);
        Ok(Response::from_bytes(&result?)?)
    }
}
