#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # secp256k1 ECDSA Signing Capability
//!
//! ECDSA over secp256k1 using the `k256` crate. The message is hashed with
//! SHA-256 by the signer; signatures are the 64-byte fixed `r || s` encoding
//! and public keys are uncompressed SEC1 points.

use k256::ecdsa::{Signature, SigningKey, VerifyingKey, signature::Signer, signature::Verifier};
use rand::rngs::OsRng;
use tracing::instrument;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::error::{PrimitiveError, Result};

/// Canonical algorithm name
pub const ECDSA_SECP256K1: &str = "ECDSA-secp256k1";

const SECRET_KEY_LEN: usize = 32;

/// secp256k1 ECDSA signer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Secp256k1Signer;

impl Secp256k1Signer {
    /// Creates the signer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SignatureCapability for Secp256k1Signer {
    fn algorithm(&self) -> &'static str {
        ECDSA_SECP256K1
    }

    #[instrument(level = "debug")]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        let secret_key = SigningKey::random(&mut OsRng);
        let public_key = VerifyingKey::from(&secret_key);
        Ok(AlgorithmKeyPair::new(
            public_key.to_encoded_point(false).as_bytes().to_vec(),
            secret_key.to_bytes().to_vec(),
        ))
    }

    #[instrument(level = "debug", skip(self, message, key), fields(message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        let secret = key.secret_key();
        if secret.len() != SECRET_KEY_LEN {
            return Err(PrimitiveError::InvalidKeyLength {
                algorithm: ECDSA_SECP256K1,
                expected: SECRET_KEY_LEN,
                actual: secret.len(),
            });
        }
        let signing_key = SigningKey::from_slice(secret).map_err(|e| PrimitiveError::InvalidKey {
            algorithm: ECDSA_SECP256K1,
            reason: e.to_string(),
        })?;
        let signature: Signature = signing_key.try_sign(message).map_err(|e| {
            PrimitiveError::Signing { algorithm: ECDSA_SECP256K1, reason: e.to_string() }
        })?;
        Ok(signature.to_bytes().to_vec())
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        let public_key = VerifyingKey::from_sec1_bytes(key.public_key()).map_err(|e| {
            PrimitiveError::InvalidKey { algorithm: ECDSA_SECP256K1, reason: e.to_string() }
        })?;
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(public_key.verify(message, &signature).is_ok())
    }
}
