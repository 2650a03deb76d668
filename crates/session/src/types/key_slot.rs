use std::str::FromStr;

use derive_more::Display;

use crate::constants::tags;

/// Key slot of the OpenPGP application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum KeySlot {
    /// Signature key, used with PSO: COMPUTE DIGITAL SIGNATURE
    #[default]
    #[display("signing")]
    Signing,
    /// Decryption key
    #[display("decryption")]
    Decryption,
    /// Authentication key, used with INTERNAL AUTHENTICATE
    #[display("authentication")]
    Authentication,
}

impl KeySlot {
    /// Control reference template tag selecting this key
    pub const fn crt(self) -> u8 {
        match self {
            Self::Signing => 0xB6,
            Self::Decryption => 0xB8,
            Self::Authentication => 0xA4,
        }
    }

    /// Tag of the algorithm attributes data object for this key
    pub const fn attributes_tag(self) -> u8 {
        match self {
            Self::Signing => tags::ALGORITHM_ATTRIBUTES_SIGNING,
            Self::Decryption => tags::ALGORITHM_ATTRIBUTES_DECRYPTION,
            Self::Authentication => tags::ALGORITHM_ATTRIBUTES_AUTHENTICATION,
        }
    }

    /// PW1 reference the key is unlocked with (`81` for signing, `82` otherwise)
    pub const fn pin_reference(self) -> u8 {
        match self {
            Self::Signing => 0x81,
            Self::Decryption | Self::Authentication => 0x82,
        }
    }
}

/// Error parsing a [`KeySlot`] name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown key slot: {0}")]
pub struct ParseKeySlotError(String);

impl FromStr for KeySlot {
    type Err = ParseKeySlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signing" | "sig" => Ok(Self::Signing),
            "decryption" | "dec" => Ok(Self::Decryption),
            "authentication" | "aut" => Ok(Self::Authentication),
            _ => Err(ParseKeySlotError(s.to_string())),
        }
    }
}
