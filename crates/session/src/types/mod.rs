//! Card data types and their TLV decoding

mod algorithm;
mod application_data;
mod card_id;
pub(crate) mod der;
mod key_slot;
mod public_key;
mod signature;

pub use algorithm::{AlgorithmId, KeyFamily, ParseAlgorithmError};
pub use application_data::{
    AlgorithmAttributes, ApplicationId, ApplicationRelatedData, Curve, EccKind, PinStatus,
};
pub use card_id::CardId;
pub use key_slot::{KeySlot, ParseKeySlotError};
pub use public_key::PublicKey;
pub use signature::Signature;

use iso7816_tlv::ber::{Tag, Tlv, Value};

use crate::{Error, Result};

/// Parse every BER-TLV object in `data`
///
/// `00` and `FF` bytes between objects are padding and skipped.
pub(crate) fn parse_all(data: &[u8]) -> Result<Vec<Tlv>> {
    let mut tlvs = Vec::new();
    let mut remaining = data;
    loop {
        while let [0x00 | 0xFF, rest @ ..] = remaining {
            remaining = rest;
        }
        if remaining.is_empty() {
            return Ok(tlvs);
        }
        let (tlv, rest) = Tlv::parse(remaining);
        tlvs.push(tlv?);
        remaining = rest;
    }
}

/// Depth-first search for the first object tagged `tag`
pub(crate) fn find<'a>(tlvs: &'a [Tlv], tag: &Tag) -> Option<&'a Tlv> {
    tlvs.iter().find_map(|tlv| {
        if tlv.tag() == tag {
            return Some(tlv);
        }
        match tlv.value() {
            Value::Constructed(children) => find(children, tag),
            Value::Primitive(_) => None,
        }
    })
}

/// Value of a primitive object
pub(crate) fn get_primitive_value<'a>(tag: &Tag, tlv: &'a Tlv) -> Result<&'a [u8]> {
    if tag != tlv.tag() {
        return Err(Error::malformed("Invalid tag"));
    }
    match tlv.value() {
        Value::Primitive(bytes) => Ok(bytes.as_slice()),
        Value::Constructed(_) => Err(Error::malformed("Invalid value type")),
    }
}

/// Value of the first primitive object tagged `tag`, if present
pub(crate) fn find_primitive<'a>(tlvs: &'a [Tlv], tag: &Tag) -> Result<Option<&'a [u8]>> {
    find(tlvs, tag)
        .map(|tlv| get_primitive_value(tag, tlv))
        .transpose()
}
