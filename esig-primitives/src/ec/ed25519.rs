#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Ed25519 Signing Capability
//!
//! RFC 8032 Ed25519 using the `ed25519-dalek` crate. Secret keys are the
//! 32-byte seed, public keys the 32-byte compressed point, signatures 64 bytes.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use tracing::instrument;
use zeroize::Zeroizing;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::error::{PrimitiveError, Result};

/// Canonical algorithm name
pub const ED25519: &str = "Ed25519";

const KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// Ed25519 signer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ed25519Signer;

impl Ed25519Signer {
    /// Creates the signer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub(crate) fn signing_key(secret_key: &[u8]) -> Result<SigningKey> {
        let seed: Zeroizing<[u8; KEY_LEN]> =
            Zeroizing::new(secret_key.try_into().map_err(|_e| PrimitiveError::InvalidKeyLength {
                algorithm: ED25519,
                expected: KEY_LEN,
                actual: secret_key.len(),
            })?);
        Ok(SigningKey::from_bytes(&seed))
    }

    pub(crate) fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey> {
        let bytes: [u8; KEY_LEN] =
            public_key.try_into().map_err(|_e| PrimitiveError::InvalidKeyLength {
                algorithm: ED25519,
                expected: KEY_LEN,
                actual: public_key.len(),
            })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|e| PrimitiveError::InvalidKey { algorithm: ED25519, reason: e.to_string() })
    }

    pub(crate) fn raw_keypair() -> AlgorithmKeyPair {
        let secret_key = SigningKey::generate(&mut OsRng);
        let public_key = VerifyingKey::from(&secret_key);
        AlgorithmKeyPair::new(public_key.to_bytes().to_vec(), secret_key.to_bytes().to_vec())
    }

    pub(crate) fn raw_sign(message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
        let signing_key = Self::signing_key(secret_key)?;
        Ok(signing_key.sign(message).to_bytes().to_vec())
    }

    pub(crate) fn raw_verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
        let verifying_key = Self::verifying_key(public_key)?;
        let Ok(bytes) = <[u8; SIGNATURE_LEN]>::try_from(signature) else {
            return Ok(false);
        };
        let signature = Signature::from_bytes(&bytes);
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}

impl SignatureCapability for Ed25519Signer {
    fn algorithm(&self) -> &'static str {
        ED25519
    }

    #[instrument(level = "debug")]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        Ok(Self::raw_keypair())
    }

    #[instrument(level = "debug", skip(self, message, key), fields(message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        Self::raw_sign(message, key.secret_key())
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        Self::raw_verify(message, signature, key.public_key())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ed25519_sign_verify() {
        let signer = Ed25519Signer::new();
        let key = signer.generate_keypair().unwrap();
        assert_eq!(key.public_key().len(), 32);
        assert_eq!(key.secret_key().len(), 32);

        let signature = signer.sign(b"edwards", &key).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signer.verify(b"edwards", &signature, &key).unwrap());
        assert!(!signer.verify(b"edwardz", &signature, &key).unwrap());
    }

    #[test]
    fn test_ed25519_is_deterministic() {
        let signer = Ed25519Signer::new();
        let key = signer.generate_keypair().unwrap();
        let a = signer.sign(b"same", &key).unwrap();
        let b = signer.sign(b"same", &key).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ed25519_rejects_short_secret() {
        let signer = Ed25519Signer::new();
        let bogus = AlgorithmKeyPair::new(vec![0; 32], vec![0; 31]);
        assert!(matches!(
            signer.sign(b"m", &bogus),
            Err(PrimitiveError::InvalidKeyLength { expected: 32, actual: 31, .. })
        ));
    }

    #[test]
    fn test_ed25519_wrong_length_signature_is_invalid() {
        let signer = Ed25519Signer::new();
        let key = signer.generate_keypair().unwrap();
        assert!(!signer.verify(b"m", &[0u8; 63], &key).unwrap());
    }
}
