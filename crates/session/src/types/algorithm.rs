use std::str::FromStr;

use derive_more::Display;

use crate::constants::{DIGEST_INFO_SHA256, DIGEST_INFO_SHA384, DIGEST_INFO_SHA512};

/// Key family an algorithm signs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum KeyFamily {
    /// Elliptic curve keys, signing with ECDSA
    #[display("ECDSA")]
    Ecdsa,
    /// RSA keys, signing with PKCS#1 v1.5
    #[display("RSA")]
    Rsa,
}

/// Signature algorithm over a precomputed digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AlgorithmId {
    /// ECDSA over a SHA-256 digest
    #[display("ECDSA-SHA256")]
    EcdsaSha256,
    /// ECDSA over a SHA-384 digest
    #[display("ECDSA-SHA384")]
    EcdsaSha384,
    /// ECDSA over a SHA-512 digest
    #[display("ECDSA-SHA512")]
    EcdsaSha512,
    /// RSA PKCS#1 v1.5 over a SHA-256 digest
    #[display("RSA-SHA256")]
    RsaSha256,
    /// RSA PKCS#1 v1.5 over a SHA-384 digest
    #[display("RSA-SHA384")]
    RsaSha384,
    /// RSA PKCS#1 v1.5 over a SHA-512 digest
    #[display("RSA-SHA512")]
    RsaSha512,
}

impl AlgorithmId {
    /// Required digest length in bytes
    pub const fn digest_len(self) -> usize {
        match self {
            Self::EcdsaSha256 | Self::RsaSha256 => 32,
            Self::EcdsaSha384 | Self::RsaSha384 => 48,
            Self::EcdsaSha512 | Self::RsaSha512 => 64,
        }
    }

    /// Key family the algorithm needs
    pub const fn family(self) -> KeyFamily {
        match self {
            Self::EcdsaSha256 | Self::EcdsaSha384 | Self::EcdsaSha512 => KeyFamily::Ecdsa,
            Self::RsaSha256 | Self::RsaSha384 | Self::RsaSha512 => KeyFamily::Rsa,
        }
    }

    /// DigestInfo prefix for RSA algorithms
    pub const fn digest_info_prefix(self) -> Option<&'static [u8]> {
        match self {
            Self::RsaSha256 => Some(DIGEST_INFO_SHA256),
            Self::RsaSha384 => Some(DIGEST_INFO_SHA384),
            Self::RsaSha512 => Some(DIGEST_INFO_SHA512),
            Self::EcdsaSha256 | Self::EcdsaSha384 | Self::EcdsaSha512 => None,
        }
    }

    /// Data field sent to the card for `digest`
    pub(crate) fn signature_input(self, digest: &[u8]) -> Vec<u8> {
        let prefix = self.digest_info_prefix().unwrap_or_default();
        let mut input = Vec::with_capacity(prefix.len() + digest.len());
        input.extend_from_slice(prefix);
        input.extend_from_slice(digest);
        input
    }
}

/// Error parsing an [`AlgorithmId`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown signature algorithm: {0}")]
pub struct ParseAlgorithmError(String);

impl FromStr for AlgorithmId {
    type Err = ParseAlgorithmError;

    /// Parses names such as `ECDSA-SHA256`, case-insensitively
    ///
    /// A bare hash name like `sha256` names no key family and is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('_', "-").as_str() {
            "ECDSA-SHA256" => Ok(Self::EcdsaSha256),
            "ECDSA-SHA384" => Ok(Self::EcdsaSha384),
            "ECDSA-SHA512" => Ok(Self::EcdsaSha512),
            "RSA-SHA256" => Ok(Self::RsaSha256),
            "RSA-SHA384" => Ok(Self::RsaSha384),
            "RSA-SHA512" => Ok(Self::RsaSha512),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("ECDSA-SHA256".parse(), Ok(AlgorithmId::EcdsaSha256));
        assert_eq!("ecdsa-sha384".parse(), Ok(AlgorithmId::EcdsaSha384));
        assert_eq!("rsa_sha512".parse(), Ok(AlgorithmId::RsaSha512));
        assert!("sha256".parse::<AlgorithmId>().is_err());
        assert!("ECDSA".parse::<AlgorithmId>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for algorithm in [
            AlgorithmId::EcdsaSha256,
            AlgorithmId::EcdsaSha512,
            AlgorithmId::RsaSha384,
        ] {
            assert_eq!(algorithm.to_string().parse(), Ok(algorithm));
        }
    }

    #[test]
    fn test_signature_input() {
        let digest = [0xAB; 32];
        assert_eq!(AlgorithmId::EcdsaSha256.signature_input(&digest), digest.to_vec());

        let input = AlgorithmId::RsaSha256.signature_input(&digest);
        assert_eq!(input.len(), 19 + 32);
        assert_eq!(
            hex::encode(&input[..19]),
            "3031300d060960864801650304020105000420"
        );
        assert_eq!(AlgorithmId::RsaSha512.digest_len(), 64);
        assert_eq!(AlgorithmId::RsaSha512.family(), KeyFamily::Rsa);
    }
}
