//! Public key read via GENERATE ASYMMETRIC KEY PAIR

use bytes::Bytes;
use iso7816_tlv::ber::Tag;
use smartcard_apdu_core::{ApduCommand, ApduResponse, ExpectedLength, Response, prelude::status};

use crate::{
    Error, Result,
    constants::{ins, tags},
    types::{KeySlot, find, find_primitive, parse_all},
};

/// Contents of a public key template (`7F49`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicKeyTemplate {
    /// RSA modulus (`81`)
    pub modulus: Option<Bytes>,
    /// RSA public exponent (`82`)
    pub exponent: Option<Bytes>,
    /// ECC public point (`86`)
    pub point: Option<Bytes>,
}

impl PublicKeyTemplate {
    /// Parse the response to a public key read
    ///
    /// Empty components count as absent.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let tlvs = parse_all(data)?;
        let template_tag = Tag::try_from(tags::PUBLIC_KEY_TEMPLATE)?;
        let template = find(&tlvs, &template_tag)
            .ok_or_else(|| Error::malformed("Missing public key template"))?;
        let children = std::slice::from_ref(template);

        let component = |tag: u8| -> Result<Option<Bytes>> {
            let found = find_primitive(children, &Tag::try_from(tag)?)?;
            Ok(found
                .filter(|value| !value.is_empty())
                .map(Bytes::copy_from_slice))
        };

        Ok(Self {
            modulus: component(tags::RSA_MODULUS)?,
            exponent: component(tags::RSA_EXPONENT)?,
            point: component(tags::ECC_POINT)?,
        })
    }

    /// Whether the template carries no key material
    pub const fn is_empty(&self) -> bool {
        self.modulus.is_none() && self.exponent.is_none() && self.point.is_none()
    }
}

/// GENERATE ASYMMETRIC KEY PAIR in read mode (`P1 = 81`)
///
/// Returns the public key of the slot without generating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPublicKeyCommand {
    slot: KeySlot,
    crt: [u8; 2],
}

impl ReadPublicKeyCommand {
    /// Read the public key in `slot`
    pub const fn new(slot: KeySlot) -> Self {
        Self {
            slot,
            crt: [slot.crt(), 0x00],
        }
    }
}

impl ApduCommand for ReadPublicKeyCommand {
    type Success = PublicKeyTemplate;
    type Error = Error;

    const NAME: &'static str = "READ PUBLIC KEY";

    fn instruction(&self) -> u8 {
        ins::GENERATE_ASYMMETRIC_KEY_PAIR
    }

    fn p1(&self) -> u8 {
        0x81
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.crt)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(0x00)
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success> {
        match response.status() {
            status::SUCCESS => {
                let template = match response.payload() {
                    Some(payload) => PublicKeyTemplate::from_bytes(payload)?,
                    None => return Err(Error::KeyUnavailable(self.slot)),
                };
                if template.is_empty() {
                    return Err(Error::KeyUnavailable(self.slot));
                }
                Ok(template)
            }
            status::REFERENCED_DATA_NOT_FOUND => Err(Error::KeyUnavailable(self.slot)),
            sw => Err(Error::unexpected_status(Self::NAME, sw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcard_apdu_core::StatusWord;

    #[test]
    fn test_read_public_key_bytes() {
        assert_eq!(
            hex::encode_upper(ReadPublicKeyCommand::new(KeySlot::Signing).to_bytes()),
            "0047810002B60000"
        );
        assert_eq!(
            hex::encode_upper(ReadPublicKeyCommand::new(KeySlot::Authentication).to_bytes()),
            "0047810002A40000"
        );
    }

    #[test]
    fn test_template_tag_is_two_bytes() {
        let tag = Tag::try_from(tags::PUBLIC_KEY_TEMPLATE).unwrap();
        assert_eq!(tag.to_bytes(), &[0x7F, 0x49]);
        assert!(tag.is_constructed());
    }

    #[test]
    fn test_parse_ecc_template() {
        let mut data = vec![0x7F, 0x49, 0x43, 0x86, 0x41, 0x04];
        data.extend_from_slice(&[0x5A; 64]);
        let template = PublicKeyTemplate::from_bytes(&data).unwrap();
        assert_eq!(template.point.unwrap().len(), 65);
        assert!(template.modulus.is_none());
    }

    #[test]
    fn test_parse_rsa_template() {
        let data = hex::decode("7F490A8103C0FFEE8203010001").unwrap();
        let template = PublicKeyTemplate::from_bytes(&data).unwrap();
        assert_eq!(template.modulus.unwrap().as_ref(), &[0xC0, 0xFF, 0xEE]);
        assert_eq!(template.exponent.unwrap().as_ref(), &[0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let command = ReadPublicKeyCommand::new(KeySlot::Signing);
        assert!(matches!(
            command.parse_response(Response::error(StatusWord::new(0x6A, 0x88))),
            Err(Error::KeyUnavailable(KeySlot::Signing))
        ));
        let empty = Response::success(Some(Bytes::from_static(&[0x7F, 0x49, 0x02, 0x86, 0x00])));
        assert!(matches!(
            command.parse_response(empty),
            Err(Error::KeyUnavailable(KeySlot::Signing))
        ));
        assert!(matches!(
            command.parse_response(Response::error(StatusWord::new(0x6D, 0x00))),
            Err(Error::CardProtocol(_))
        ));
    }
}
