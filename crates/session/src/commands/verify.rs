//! VERIFY

use smartcard_apdu_core::{ApduCommand, ApduResponse, ExpectedLength, Response, prelude::status};
use zeroize::Zeroizing;

use crate::{
    Error, Result,
    constants::{PIN_MAX_LENGTH, PIN_MIN_LENGTH, ins},
    types::KeySlot,
};

/// VERIFY PW1 for the key in a slot
///
/// The PIN buffer is wiped when the command is dropped.
pub struct VerifyCommand {
    reference: u8,
    pin: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for VerifyCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyCommand")
            .field("reference", &format_args!("{:#04x}", self.reference))
            .field("pin", &"<redacted>")
            .finish()
    }
}

impl VerifyCommand {
    /// VERIFY `pin` against the PW1 reference of `slot`
    pub fn new(slot: KeySlot, pin: &[u8]) -> Result<Self> {
        if !(PIN_MIN_LENGTH..=PIN_MAX_LENGTH).contains(&pin.len()) {
            return Err(Error::InvalidPin(pin.len()));
        }
        Ok(Self {
            reference: slot.pin_reference(),
            pin: Zeroizing::new(pin.to_vec()),
        })
    }
}

impl ApduCommand for VerifyCommand {
    type Success = ();
    type Error = Error;

    const NAME: &'static str = "VERIFY";

    fn instruction(&self) -> u8 {
        ins::VERIFY
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        self.reference
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.pin)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success> {
        let sw = response.status();
        if let Some(retries) = sw.retry_counter() {
            return Err(Error::PinRejected {
                retries: Some(retries),
            });
        }
        match sw {
            status::SUCCESS => Ok(()),
            status::SECURITY_CONDITION_NOT_SATISFIED => Err(Error::PinRejected { retries: None }),
            status::AUTH_METHOD_BLOCKED => Err(Error::PinBlocked),
            sw => Err(Error::unexpected_status(Self::NAME, sw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcard_apdu_core::StatusWord;

    #[test]
    fn test_verify_bytes() {
        let command = VerifyCommand::new(KeySlot::Signing, b"123456").unwrap();
        assert_eq!(hex::encode_upper(command.to_bytes()), "0020008106313233343536");

        let command = VerifyCommand::new(KeySlot::Authentication, b"123456").unwrap();
        assert_eq!(command.p2(), 0x82);
        assert!(!format!("{command:?}").contains("313233"));
    }

    #[test]
    fn test_pin_length() {
        assert!(matches!(
            VerifyCommand::new(KeySlot::Signing, b"12345"),
            Err(Error::InvalidPin(5))
        ));
        assert!(VerifyCommand::new(KeySlot::Signing, &[0x31; 128]).is_err());
        assert!(VerifyCommand::new(KeySlot::Signing, &[0x31; 127]).is_ok());
    }

    #[test]
    fn test_verify_status_mapping() {
        let command = VerifyCommand::new(KeySlot::Signing, b"000000").unwrap();
        assert!(command.parse_response(Response::success(None)).is_ok());
        assert!(matches!(
            command.parse_response(Response::error(StatusWord::new(0x63, 0xC2))),
            Err(Error::PinRejected { retries: Some(2) })
        ));
        assert!(matches!(
            command.parse_response(Response::error(StatusWord::new(0x69, 0x82))),
            Err(Error::PinRejected { retries: None })
        ));
        assert!(matches!(
            command.parse_response(Response::error(StatusWord::new(0x69, 0x83))),
            Err(Error::PinBlocked)
        ));
    }
}
