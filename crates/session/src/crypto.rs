//! Public key retrieval and signing

use smartcard_apdu_core::CardTransport;
use tracing::{debug, instrument, warn};

use crate::{
    Error, Result,
    commands::{GetDataCommand, ReadPublicKeyCommand, SignCommand, VerifyCommand},
    session::Session,
    types::{AlgorithmAttributes, AlgorithmId, KeyFamily, PinStatus, PublicKey, Signature, der},
};

impl<T: CardTransport> Session<T> {
    /// Read the public key of the configured slot
    #[instrument(skip(self), fields(card = %self.id(), slot = %self.key_slot()))]
    pub fn public_key(&self) -> Result<PublicKey> {
        let slot = self.key_slot();
        let template = self.execute(&ReadPublicKeyCommand::new(slot))?;

        match (template.point, template.modulus, template.exponent) {
            (Some(point), _, _) => {
                let curve = self
                    .algorithm_attributes(slot)
                    .and_then(AlgorithmAttributes::curve)
                    .cloned()
                    .ok_or_else(|| Error::malformed("ECC key without curve attributes"))?;
                debug!(%curve, len = point.len(), "Read ECC public key");
                Ok(PublicKey::Ecc { curve, point })
            }
            (None, Some(modulus), Some(exponent)) => {
                debug!(bits = modulus.len() * 8, "Read RSA public key");
                Ok(PublicKey::Rsa { modulus, exponent })
            }
            (None, _, _) => Err(Error::KeyUnavailable(slot)),
        }
    }

    /// Sign a precomputed `digest` with the key in the configured slot
    ///
    /// The digest length is checked before the card is contacted. ECDSA
    /// signatures are returned DER encoded.
    #[instrument(skip(self, digest), fields(card = %self.id(), slot = %self.key_slot()))]
    pub fn sign(&self, algorithm: AlgorithmId, digest: &[u8]) -> Result<Signature> {
        if digest.len() != algorithm.digest_len() {
            return Err(Error::InvalidDigestLength {
                algorithm,
                expected: algorithm.digest_len(),
                actual: digest.len(),
            });
        }
        if !self.is_open() {
            return Err(Error::SessionClosed(self.id().clone()));
        }

        let slot = self.key_slot();
        let attributes = self.algorithm_attributes(slot);
        let matches_key = attributes.is_none_or(|attributes| match algorithm.family() {
            KeyFamily::Ecdsa => attributes.is_ecdsa(),
            KeyFamily::Rsa => attributes.is_rsa(),
        });
        if !matches_key {
            warn!(%algorithm, "Algorithm does not match the key");
            return Err(Error::AlgorithmMismatch { algorithm, slot });
        }

        let command = SignCommand::new(slot, algorithm.signature_input(digest))?;
        let raw = self.execute(&command)?;

        let signature: Signature = match algorithm.family() {
            KeyFamily::Ecdsa => {
                der::ecdsa_signature(attributes.and_then(AlgorithmAttributes::curve), &raw)?
                    .into()
            }
            KeyFamily::Rsa => Signature::from(raw),
        };
        debug!(len = signature.len(), "Signed digest");
        Ok(signature)
    }

    /// VERIFY PW1 for the configured slot
    ///
    /// The caller supplies the PIN; it is wiped once sent.
    #[instrument(skip(self, pin), fields(card = %self.id()))]
    pub fn verify_pin(&self, pin: &[u8]) -> Result<()> {
        let command = VerifyCommand::new(self.key_slot(), pin)?;
        self.execute(&command).inspect_err(|e| {
            if matches!(e, Error::PinRejected { .. } | Error::PinBlocked) {
                warn!(error = %e, "PIN verification failed");
            }
        })
    }

    /// Read the PW status bytes
    pub fn pin_status(&self) -> Result<PinStatus> {
        let data = self.execute(&GetDataCommand::pin_status())?;
        PinStatus::from_bytes(&data)
    }
}
