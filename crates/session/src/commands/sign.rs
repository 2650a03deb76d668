//! PSO: COMPUTE DIGITAL SIGNATURE and INTERNAL AUTHENTICATE

use bytes::Bytes;
use smartcard_apdu_core::{ApduCommand, ApduResponse, ExpectedLength, Response, prelude::status};
use tracing::warn;

use crate::{Error, Result, constants::ins, types::KeySlot};

/// Signature command for one key slot
///
/// The signing slot uses PSO: COMPUTE DIGITAL SIGNATURE (`00 2A 9E 9A`),
/// the authentication slot INTERNAL AUTHENTICATE (`00 88 00 00`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignCommand {
    slot: KeySlot,
    input: Vec<u8>,
}

impl SignCommand {
    /// Sign `input` (a digest or DigestInfo) with the key in `slot`
    pub fn new(slot: KeySlot, input: impl Into<Vec<u8>>) -> Result<Self> {
        match slot {
            KeySlot::Signing | KeySlot::Authentication => Ok(Self {
                slot,
                input: input.into(),
            }),
            KeySlot::Decryption => Err(Error::UnsupportedOperation(
                "the decryption key cannot sign",
            )),
        }
    }

    /// Slot holding the key
    pub const fn slot(&self) -> KeySlot {
        self.slot
    }
}

impl ApduCommand for SignCommand {
    type Success = Bytes;
    type Error = Error;

    const NAME: &'static str = "SIGN";

    fn instruction(&self) -> u8 {
        match self.slot {
            KeySlot::Authentication => ins::INTERNAL_AUTHENTICATE,
            KeySlot::Signing | KeySlot::Decryption => ins::PERFORM_SECURITY_OPERATION,
        }
    }

    fn p1(&self) -> u8 {
        match self.slot {
            KeySlot::Authentication => 0x00,
            KeySlot::Signing | KeySlot::Decryption => 0x9E,
        }
    }

    fn p2(&self) -> u8 {
        match self.slot {
            KeySlot::Authentication => 0x00,
            KeySlot::Signing | KeySlot::Decryption => 0x9A,
        }
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.input)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(0x00)
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success> {
        match response.status() {
            status::SUCCESS => match response.payload() {
                Some(signature) => Ok(signature.clone()),
                None => Err(Error::malformed("Empty signature")),
            },
            sw @ (status::SECURITY_CONDITION_NOT_SATISFIED
            | status::AUTH_METHOD_BLOCKED
            | status::CONDITIONS_NOT_SATISFIED) => {
                warn!(slot = %self.slot, status = %sw, "Card rejected signing request");
                Err(Error::SigningRejected { status: sw })
            }
            status::REFERENCED_DATA_NOT_FOUND => Err(Error::KeyUnavailable(self.slot)),
            sw => Err(Error::unexpected_status(Self::NAME, sw)),
        }
    }
}
