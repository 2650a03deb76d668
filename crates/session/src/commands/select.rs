//! SELECT

use smartcard_apdu_core::{ApduCommand, ExpectedLength, Response, prelude::status};

use crate::{Error, constants::{OPENPGP_AID, ins}};

/// Outcome of selecting the OpenPGP application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The application is selected
    Selected,
    /// The card has no OpenPGP application
    NotPresent,
}

/// SELECT by application identifier
#[derive(Debug, Clone)]
pub struct SelectCommand {
    aid: Vec<u8>,
}

impl SelectCommand {
    /// Select the OpenPGP application
    pub fn openpgp() -> Self {
        Self::with_aid(OPENPGP_AID)
    }

    /// Select the application with the given (partial) AID
    pub fn with_aid(aid: &[u8]) -> Self {
        Self { aid: aid.to_vec() }
    }
}

impl ApduCommand for SelectCommand {
    type Success = Selection;
    type Error = Error;

    const NAME: &'static str = "SELECT";

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        0x04
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.aid)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(0x00)
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error> {
        use smartcard_apdu_core::ApduResponse;

        match response.status() {
            status::SUCCESS => Ok(Selection::Selected),
            status::FILE_NOT_FOUND => Ok(Selection::NotPresent),
            sw => Err(Error::unexpected_status(Self::NAME, sw)),
        }
    }
}
