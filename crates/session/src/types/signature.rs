use bytes::Bytes;
use derive_more::{Deref, From};

/// Signature produced by the card
///
/// DER `ECDSA-Sig-Value` for ECDSA keys, raw PKCS#1 v1.5 bytes for RSA keys.
#[derive(Debug, Clone, PartialEq, Eq, Deref, From)]
pub struct Signature(Bytes);

impl Signature {
    /// Signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying bytes
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Signature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}
