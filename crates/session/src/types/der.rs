//! Minimal DER encoding for signature values and RSA public keys

use iso7816_tlv::ber::{Tag, Tlv, Value};

use super::Curve;
use crate::{Error, Result};

const TAG_INTEGER: u8 = 0x02;
const TAG_SEQUENCE: u8 = 0x30;

/// Encode a big-endian unsigned integer as a DER INTEGER
pub(crate) fn integer(bytes: &[u8]) -> Result<Tlv> {
    Ok(Tlv::new(
        Tag::try_from(TAG_INTEGER)?,
        Value::Primitive(unsigned_be(bytes)),
    )?)
}

/// Encode `items` as a DER SEQUENCE
pub(crate) fn sequence(items: Vec<Tlv>) -> Result<Vec<u8>> {
    Ok(Tlv::new(Tag::try_from(TAG_SEQUENCE)?, Value::Constructed(items))?.to_vec())
}

/// Minimal two's complement form of an unsigned big-endian integer
///
/// Leading zeros are stripped and a single zero is prepended when the high
/// bit of the first byte is set. Zero encodes as one `00` byte. The same
/// form serves as an SSH `mpint` body.
pub(crate) fn unsigned_be(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    match trimmed.first() {
        None => vec![0x00],
        Some(&first) if first & 0x80 != 0 => {
            let mut out = Vec::with_capacity(trimmed.len() + 1);
            out.push(0x00);
            out.extend_from_slice(trimmed);
            out
        }
        Some(_) => trimmed.to_vec(),
    }
}

/// Re-encode a raw `r || s` ECDSA signature as a DER `ECDSA-Sig-Value`
pub(crate) fn ecdsa_signature(curve: Option<&Curve>, raw: &[u8]) -> Result<Vec<u8>> {
    let invalid = |_| Error::malformed("Invalid ECDSA signature");
    match curve {
        Some(Curve::NistP256) => Ok(p256::ecdsa::Signature::from_slice(raw)
            .map_err(invalid)?
            .to_der()
            .as_bytes()
            .to_vec()),
        Some(Curve::NistP384) => Ok(p384::ecdsa::Signature::from_slice(raw)
            .map_err(invalid)?
            .to_der()
            .as_bytes()
            .to_vec()),
        Some(Curve::Secp256k1) => Ok(k256::ecdsa::Signature::from_slice(raw)
            .map_err(invalid)?
            .to_der()
            .as_bytes()
            .to_vec()),
        other => {
            if raw.is_empty() || !raw.len().is_multiple_of(2) {
                return Err(Error::malformed("Invalid ECDSA signature"));
            }
            if let Some(size) = other.and_then(Curve::field_size)
                && raw.len() != size * 2
            {
                return Err(Error::malformed("ECDSA signature does not match the curve"));
            }
            let (r, s) = raw.split_at(raw.len() / 2);
            sequence(vec![integer(r)?, integer(s)?])
        }
    }
}

/// DER `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`
pub(crate) fn rsa_public_key(modulus: &[u8], exponent: &[u8]) -> Result<Vec<u8>> {
    sequence(vec![integer(modulus)?, integer(exponent)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_be() {
        assert_eq!(unsigned_be(&[0x00, 0x00, 0x01]), vec![0x01]);
        assert_eq!(unsigned_be(&[0x80]), vec![0x00, 0x80]);
        assert_eq!(unsigned_be(&[0x00, 0xFF, 0x01]), vec![0x00, 0xFF, 0x01]);
        assert_eq!(unsigned_be(&[]), vec![0x00]);
        assert_eq!(unsigned_be(&[0x00, 0x00]), vec![0x00]);
    }

    #[test]
    fn test_rsa_public_key() {
        let der = rsa_public_key(&[0xC0, 0x01], &[0x01, 0x00, 0x01]).unwrap();
        assert_eq!(hex::encode(der), "300a020300c0010203010001");
    }

    #[test]
    fn test_generic_ecdsa_signature() {
        let mut raw = vec![0x00; 32];
        raw[31] = 0x01;
        raw.extend_from_slice(&[0x80; 32]);
        let der = ecdsa_signature(Some(&Curve::BrainpoolP256r1), &raw).unwrap();
        assert_eq!(&der[..5], &[0x30, 0x26, 0x02, 0x01, 0x01]);
        assert_eq!(&der[5..8], &[0x02, 0x21, 0x00]);
        assert_eq!(der.len(), 2 + 3 + 35);

        assert!(ecdsa_signature(Some(&Curve::BrainpoolP384r1), &raw).is_err());
        assert!(ecdsa_signature(None, &raw[..3]).is_err());
    }

    #[test]
    fn test_p256_signature_matches_generic() {
        let raw = hex::decode(concat!(
            "8f4d4d6d8b5b0e7e2f6c1b0e4a8d1a3c5e7f9b2d4c6e8a0b1c3d5e7f9a1b3c5d",
            "3a5c7e9f1b3d5f7a9c1e3b5d7f9a1c3e5b7d9f1a3c5e7b9d1f3a5c7e9b1d3f5a"
        ))
        .unwrap();
        let curve_der = ecdsa_signature(Some(&Curve::NistP256), &raw).unwrap();
        let generic_der = ecdsa_signature(None, &raw).unwrap();
        assert_eq!(curve_der, generic_der);
        assert!(curve_der.len() <= 72);
    }
}
