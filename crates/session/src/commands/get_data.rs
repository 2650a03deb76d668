//! GET DATA

use bytes::Bytes;
use smartcard_apdu_core::{ApduCommand, ApduResponse, ExpectedLength, Response, prelude::status};

use crate::{
    Error,
    constants::{ins, tags},
};

/// GET DATA for a single byte data object tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDataCommand {
    tag: u8,
}

impl GetDataCommand {
    /// GET DATA for `tag`
    pub const fn new(tag: u8) -> Self {
        Self { tag }
    }

    /// Application related data (`6E`)
    pub const fn application_related_data() -> Self {
        Self::new(tags::APPLICATION_RELATED_DATA)
    }

    /// PW status bytes (`C4`)
    pub const fn pin_status() -> Self {
        Self::new(tags::PW_STATUS)
    }
}

impl ApduCommand for GetDataCommand {
    type Success = Bytes;
    type Error = Error;

    const NAME: &'static str = "GET DATA";

    fn instruction(&self) -> u8 {
        ins::GET_DATA
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        self.tag
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(0x00)
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error> {
        match response.status() {
            status::SUCCESS => Ok(response.payload().clone().unwrap_or_default()),
            sw => Err(Error::unexpected_status(Self::NAME, sw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcard_apdu_core::StatusWord;

    #[test]
    fn test_get_data_bytes() {
        assert_eq!(
            hex::encode_upper(GetDataCommand::application_related_data().to_bytes()),
            "00CA006E00"
        );
        assert_eq!(
            hex::encode_upper(GetDataCommand::pin_status().to_bytes()),
            "00CA00C400"
        );
    }

    #[test]
    fn test_get_data_response() {
        let command = GetDataCommand::pin_status();
        let payload = Bytes::from_static(&[0x00, 0x20, 0x20, 0x20, 0x03, 0x00, 0x03]);
        assert_eq!(
            command
                .parse_response(Response::success(Some(payload.clone())))
                .unwrap(),
            payload
        );
        assert!(matches!(
            command.parse_response(Response::error(StatusWord::new(0x6A, 0x88))),
            Err(Error::CardProtocol(_))
        ));
    }
}
