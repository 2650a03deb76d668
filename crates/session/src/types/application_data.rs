use std::fmt;

use iso7816_tlv::ber::{Tag, Tlv};

use super::{KeySlot, find_primitive, parse_all};
use crate::{
    Error, Result,
    constants::{OPENPGP_AID, algorithm, tags},
};

/// OpenPGP application identifier
///
/// `D2 76 00 01 24 | 01 | VV VV | MM MM | SS SS SS SS | 00 00`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationId([u8; 16]);

impl ApplicationId {
    /// Parse a full 16 byte AID
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let aid: [u8; 16] = bytes
            .try_into()
            .map_err(|_| Error::malformed("Application identifier must be 16 bytes"))?;
        if !aid.starts_with(OPENPGP_AID) {
            return Err(Error::malformed("Not an OpenPGP application identifier"));
        }
        Ok(Self(aid))
    }

    /// Raw AID bytes
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Specification version as (major, minor)
    pub const fn version(&self) -> (u8, u8) {
        (self.0[6], self.0[7])
    }

    /// Manufacturer code
    pub const fn manufacturer(&self) -> u16 {
        u16::from_be_bytes([self.0[8], self.0[9]])
    }

    /// Card serial number
    pub const fn serial(&self) -> u32 {
        u32::from_be_bytes([self.0[10], self.0[11], self.0[12], self.0[13]])
    }

    /// Card ident in the form `MMMM:SSSSSSSS`
    pub fn ident(&self) -> String {
        format!("{:04X}:{:08X}", self.manufacturer(), self.serial())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

/// Kind of elliptic curve key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EccKind {
    /// Key agreement
    Ecdh,
    /// ECDSA signing
    Ecdsa,
    /// EdDSA signing
    EdDsa,
}

/// Elliptic curve named in algorithm attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256
    NistP256,
    /// NIST P-384
    NistP384,
    /// NIST P-521
    NistP521,
    /// secp256k1
    Secp256k1,
    /// brainpoolP256r1
    BrainpoolP256r1,
    /// brainpoolP384r1
    BrainpoolP384r1,
    /// brainpoolP512r1
    BrainpoolP512r1,
    /// Ed25519
    Ed25519,
    /// X25519
    X25519,
    /// Any other curve, by OID
    Unknown(Vec<u8>),
}

const OID_NIST_P256: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
const OID_NIST_P384: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x22];
const OID_NIST_P521: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x23];
const OID_SECP256K1: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x0A];
const OID_BRAINPOOL_P256R1: &[u8] = &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x07];
const OID_BRAINPOOL_P384R1: &[u8] = &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0B];
const OID_BRAINPOOL_P512R1: &[u8] = &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0D];
const OID_ED25519: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
const OID_X25519: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01];

impl Curve {
    /// Curve for a DER OID body
    pub fn from_oid(oid: &[u8]) -> Self {
        match oid {
            OID_NIST_P256 => Self::NistP256,
            OID_NIST_P384 => Self::NistP384,
            OID_NIST_P521 => Self::NistP521,
            OID_SECP256K1 => Self::Secp256k1,
            OID_BRAINPOOL_P256R1 => Self::BrainpoolP256r1,
            OID_BRAINPOOL_P384R1 => Self::BrainpoolP384r1,
            OID_BRAINPOOL_P512R1 => Self::BrainpoolP512r1,
            OID_ED25519 => Self::Ed25519,
            OID_X25519 => Self::X25519,
            other => Self::Unknown(other.to_vec()),
        }
    }

    /// DER OID body of the curve
    pub fn oid(&self) -> &[u8] {
        match self {
            Self::NistP256 => OID_NIST_P256,
            Self::NistP384 => OID_NIST_P384,
            Self::NistP521 => OID_NIST_P521,
            Self::Secp256k1 => OID_SECP256K1,
            Self::BrainpoolP256r1 => OID_BRAINPOOL_P256R1,
            Self::BrainpoolP384r1 => OID_BRAINPOOL_P384R1,
            Self::BrainpoolP512r1 => OID_BRAINPOOL_P512R1,
            Self::Ed25519 => OID_ED25519,
            Self::X25519 => OID_X25519,
            Self::Unknown(oid) => oid,
        }
    }

    /// Size in bytes of one scalar, and so of `r` and `s` in a signature
    pub const fn field_size(&self) -> Option<usize> {
        match self {
            Self::NistP256 | Self::Secp256k1 | Self::BrainpoolP256r1 => Some(32),
            Self::Ed25519 | Self::X25519 => Some(32),
            Self::NistP384 | Self::BrainpoolP384r1 => Some(48),
            Self::BrainpoolP512r1 => Some(64),
            Self::NistP521 => Some(66),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NistP256 => f.write_str("NIST P-256"),
            Self::NistP384 => f.write_str("NIST P-384"),
            Self::NistP521 => f.write_str("NIST P-521"),
            Self::Secp256k1 => f.write_str("secp256k1"),
            Self::BrainpoolP256r1 => f.write_str("brainpoolP256r1"),
            Self::BrainpoolP384r1 => f.write_str("brainpoolP384r1"),
            Self::BrainpoolP512r1 => f.write_str("brainpoolP512r1"),
            Self::Ed25519 => f.write_str("Ed25519"),
            Self::X25519 => f.write_str("X25519"),
            Self::Unknown(oid) => write!(f, "OID {}", hex::encode_upper(oid)),
        }
    }
}

/// Algorithm attributes of one key slot (DO `C1`, `C2` or `C3`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmAttributes {
    /// RSA key
    Rsa {
        /// Modulus length in bits
        modulus_bits: u16,
        /// Public exponent length in bits
        exponent_bits: u16,
        /// Private key import format
        import_format: u8,
    },
    /// Elliptic curve key
    Ecc {
        /// ECDH, ECDSA or EdDSA
        kind: EccKind,
        /// Curve the key lives on
        curve: Curve,
        /// Import format byte, present only when it is `FF`
        import_format: Option<u8>,
    },
}

impl AlgorithmAttributes {
    /// Parse the value of an algorithm attributes data object
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match data {
            [algorithm::RSA, n1, n2, e1, e2, rest @ ..] => Ok(Self::Rsa {
                modulus_bits: u16::from_be_bytes([*n1, *n2]),
                exponent_bits: u16::from_be_bytes([*e1, *e2]),
                import_format: rest.first().copied().unwrap_or(0),
            }),
            [id @ (algorithm::ECDH | algorithm::ECDSA | algorithm::EDDSA), oid @ ..] => {
                let kind = match *id {
                    algorithm::ECDH => EccKind::Ecdh,
                    algorithm::ECDSA => EccKind::Ecdsa,
                    _ => EccKind::EdDsa,
                };
                // The last OID byte never has its high bit set
                let (oid, import_format) = match oid {
                    [oid @ .., 0xFF] => (oid, Some(0xFF)),
                    oid => (oid, None),
                };
                if oid.is_empty() {
                    return Err(Error::malformed("Missing curve OID"));
                }
                Ok(Self::Ecc {
                    kind,
                    curve: Curve::from_oid(oid),
                    import_format,
                })
            }
            [algorithm::RSA, ..] => Err(Error::malformed("Truncated RSA attributes")),
            _ => Err(Error::malformed("Unknown algorithm attributes")),
        }
    }

    /// Whether the key can produce ECDSA signatures
    pub const fn is_ecdsa(&self) -> bool {
        matches!(
            self,
            Self::Ecc {
                kind: EccKind::Ecdsa,
                ..
            }
        )
    }

    /// Whether the key is an RSA key
    pub const fn is_rsa(&self) -> bool {
        matches!(self, Self::Rsa { .. })
    }

    /// Curve of an ECC key
    pub const fn curve(&self) -> Option<&Curve> {
        match self {
            Self::Ecc { curve, .. } => Some(curve),
            Self::Rsa { .. } => None,
        }
    }
}

/// Application related data (DO `6E`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRelatedData {
    /// Full application identifier
    pub aid: ApplicationId,
    /// Signing key attributes
    pub signing: Option<AlgorithmAttributes>,
    /// Decryption key attributes
    pub decryption: Option<AlgorithmAttributes>,
    /// Authentication key attributes
    pub authentication: Option<AlgorithmAttributes>,
}

impl ApplicationRelatedData {
    /// Parse the GET DATA `6E` response, with or without the outer tag
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let tlvs = parse_all(data)?;
        let aid_tag = Tag::try_from(tags::APPLICATION_IDENTIFIER)?;
        let aid = find_primitive(&tlvs, &aid_tag)?
            .ok_or_else(|| Error::malformed("Missing application identifier"))?;

        Ok(Self {
            aid: ApplicationId::from_bytes(aid)?,
            signing: attributes(&tlvs, KeySlot::Signing)?,
            decryption: attributes(&tlvs, KeySlot::Decryption)?,
            authentication: attributes(&tlvs, KeySlot::Authentication)?,
        })
    }

    /// Attributes of the key in `slot`
    pub const fn attributes(&self, slot: KeySlot) -> Option<&AlgorithmAttributes> {
        match slot {
            KeySlot::Signing => self.signing.as_ref(),
            KeySlot::Decryption => self.decryption.as_ref(),
            KeySlot::Authentication => self.authentication.as_ref(),
        }
    }
}

fn attributes(tlvs: &[Tlv], slot: KeySlot) -> Result<Option<AlgorithmAttributes>> {
    let tag = Tag::try_from(slot.attributes_tag())?;
    // Absent and empty both mean the card does not report attributes
    match find_primitive(tlvs, &tag)? {
        Some(value) if !value.is_empty() => AlgorithmAttributes::from_bytes(value).map(Some),
        _ => Ok(None),
    }
}

/// PW status bytes (DO `C4`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinStatus {
    /// PW1 stays valid for more than one signature
    pub pw1_valid_multiple: bool,
    /// Maximum PW1 length
    pub pw1_max_length: u8,
    /// Maximum resetting code length
    pub rc_max_length: u8,
    /// Maximum PW3 length
    pub pw3_max_length: u8,
    /// PW1 retries left
    pub pw1_retries: u8,
    /// Resetting code retries left
    pub rc_retries: u8,
    /// PW3 retries left
    pub pw3_retries: u8,
}

impl PinStatus {
    /// Parse the 7 status bytes, optionally wrapped in a `C4` object
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let bytes = match data {
            [tags::PW_STATUS, 0x07, rest @ ..] => rest,
            bytes => bytes,
        };
        match bytes {
            [validity, pw1_max, rc_max, pw3_max, pw1, rc, pw3] => Ok(Self {
                pw1_valid_multiple: *validity == 0x01,
                pw1_max_length: *pw1_max,
                rc_max_length: *rc_max,
                pw3_max_length: *pw3_max,
                pw1_retries: *pw1,
                rc_retries: *rc,
                pw3_retries: *pw3,
            }),
            _ => Err(Error::malformed("PW status must be 7 bytes")),
        }
    }
}
