use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;

use super::{Curve, der};
use crate::{Error, Result};

/// Public key read from a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// RSA public key, big-endian components
    Rsa {
        /// Modulus
        modulus: Bytes,
        /// Public exponent
        exponent: Bytes,
    },
    /// Elliptic curve public key
    Ecc {
        /// Curve from the slot's algorithm attributes
        curve: Curve,
        /// Encoded point as returned by the card
        point: Bytes,
    },
}

impl PublicKey {
    /// EC point, for ECC keys
    pub const fn ec_point(&self) -> Option<&Bytes> {
        match self {
            Self::Ecc { point, .. } => Some(point),
            Self::Rsa { .. } => None,
        }
    }

    /// Curve, for ECC keys
    pub const fn curve(&self) -> Option<&Curve> {
        match self {
            Self::Ecc { curve, .. } => Some(curve),
            Self::Rsa { .. } => None,
        }
    }

    /// Encoded key bytes
    ///
    /// The raw point for ECC keys (65 bytes for uncompressed P-256) and a DER
    /// `RSAPublicKey` for RSA keys.
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Self::Ecc { point, .. } => Ok(point.clone()),
            Self::Rsa { modulus, exponent } => {
                der::rsa_public_key(modulus, exponent).map(Bytes::from)
            }
        }
    }

    /// OpenSSH `authorized_keys` encoding, `<type> <base64>`
    pub fn to_openssh(&self) -> Result<String> {
        let mut blob = Vec::new();
        let key_type = match self {
            Self::Rsa { modulus, exponent } => {
                put_string(&mut blob, b"ssh-rsa");
                put_mpint(&mut blob, exponent);
                put_mpint(&mut blob, modulus);
                "ssh-rsa"
            }
            Self::Ecc {
                curve: Curve::Ed25519,
                point,
            } => {
                // Some cards prefix the native key with 0x40
                let key = match point.as_ref() {
                    [0x40, key @ ..] if key.len() == 32 => key,
                    key => key,
                };
                if key.len() != 32 {
                    return Err(Error::malformed("Ed25519 key must be 32 bytes"));
                }
                put_string(&mut blob, b"ssh-ed25519");
                put_string(&mut blob, key);
                "ssh-ed25519"
            }
            Self::Ecc { curve, point } => {
                let (key_type, identifier) = match curve {
                    Curve::NistP256 => ("ecdsa-sha2-nistp256", "nistp256"),
                    Curve::NistP384 => ("ecdsa-sha2-nistp384", "nistp384"),
                    Curve::NistP521 => ("ecdsa-sha2-nistp521", "nistp521"),
                    _ => return Err(Error::UnsupportedOperation("OpenSSH encoding for this curve")),
                };
                put_string(&mut blob, key_type.as_bytes());
                put_string(&mut blob, identifier.as_bytes());
                put_string(&mut blob, point);
                key_type
            }
        };
        Ok(format!("{key_type} {}", STANDARD.encode(blob)))
    }
}

fn put_string(out: &mut Vec<u8>, value: &[u8]) {
    // Lengths come from card data objects and always fit
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value);
}

fn put_mpint(out: &mut Vec<u8>, value: &[u8]) {
    let value = der::unsigned_be(value);
    // SSH encodes zero as an empty mpint
    if value == [0x00] {
        put_string(out, &[]);
    } else {
        put_string(out, &value);
    }
}
