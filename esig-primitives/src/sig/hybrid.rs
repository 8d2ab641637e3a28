#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Hybrid ML-DSA-65 + Ed25519 Signing Capability
//!
//! One catalog entry that is itself a composition of a post-quantum and a
//! classical scheme. Both halves sign the same message independently and a
//! hybrid signature verifies only if both halves verify.
//!
//! ```text
//! public key  = pk_ml_dsa (1952) || pk_ed25519 (32)
//! secret key  = sk_ml_dsa (4032) || sk_ed25519 (32)
//! signature   = sig_ml_dsa (3309) || sig_ed25519 (64)
//! ```

use tracing::instrument;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::ec::ed25519::Ed25519Signer;
use crate::error::{PrimitiveError, Result};
use crate::sig::ml_dsa::{MlDsaParameterSet, MlDsaSigner};

/// Canonical algorithm name
pub const HYBRID_ML_DSA_65_ED25519: &str = "Hybrid-ML-DSA-65+Ed25519";

const PQ: MlDsaParameterSet = MlDsaParameterSet::MLDSA65;
const ED_KEY_LEN: usize = 32;
const ED_SIG_LEN: usize = 64;

/// Hybrid ML-DSA-65 + Ed25519 signer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridSigner {
    pq: MlDsaSigner,
}

impl Default for HybridSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl HybridSigner {
    /// Creates the signer.
    #[must_use]
    pub const fn new() -> Self {
        Self { pq: MlDsaSigner::new(PQ) }
    }

    /// Total hybrid signature length in bytes.
    #[must_use]
    pub const fn signature_size() -> usize {
        PQ.signature_size() + ED_SIG_LEN
    }

    fn split<'a>(bytes: &'a [u8], pq_len: usize, what: &str) -> Result<(&'a [u8], &'a [u8])> {
        if bytes.len() != pq_len + ED_KEY_LEN {
            return Err(PrimitiveError::InvalidKey {
                algorithm: HYBRID_ML_DSA_65_ED25519,
                reason: format!("{what} must be {} bytes, got {}", pq_len + ED_KEY_LEN, bytes.len()),
            });
        }
        Ok(bytes.split_at(pq_len))
    }
}

impl SignatureCapability for HybridSigner {
    fn algorithm(&self) -> &'static str {
        HYBRID_ML_DSA_65_ED25519
    }

    #[instrument(level = "debug")]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        let pq = self.pq.generate_keypair()?;
        let ed = Ed25519Signer::raw_keypair();

        let mut public_key = Vec::with_capacity(PQ.public_key_size() + ED_KEY_LEN);
        public_key.extend_from_slice(pq.public_key());
        public_key.extend_from_slice(ed.public_key());

        let mut secret_key = Vec::with_capacity(PQ.secret_key_size() + ED_KEY_LEN);
        secret_key.extend_from_slice(pq.secret_key());
        secret_key.extend_from_slice(ed.secret_key());

        Ok(AlgorithmKeyPair::new(public_key, secret_key))
    }

    #[instrument(level = "debug", skip(self, message, key), fields(message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        let (pq_sk, ed_sk) = Self::split(key.secret_key(), PQ.secret_key_size(), "secret key")?;

        let mut signature = self.pq.sign_with_secret(message, pq_sk)?;
        signature.extend_from_slice(&Ed25519Signer::raw_sign(message, ed_sk)?);
        Ok(signature)
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        let (pq_pk, ed_pk) = Self::split(key.public_key(), PQ.public_key_size(), "public key")?;
        if signature.len() != Self::signature_size() {
            return Ok(false);
        }
        let (pq_sig, ed_sig) = signature.split_at(PQ.signature_size());

        let pq_valid = self.pq.verify_with_public(message, pq_sig, pq_pk)?;
        let ed_valid = Ed25519Signer::raw_verify(message, ed_sig, ed_pk)?;
        Ok(pq_valid && ed_valid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_hybrid_sign_verify() {
        let signer = HybridSigner::new();
        let key = signer.generate_keypair().unwrap();
        assert_eq!(key.public_key().len(), 1952 + 32);
        assert_eq!(key.secret_key().len(), 4032 + 32);

        let signature = signer.sign(b"belt and braces", &key).unwrap();
        assert_eq!(signature.len(), HybridSigner::signature_size());
        assert!(signer.verify(b"belt and braces", &signature, &key).unwrap());
        assert!(!signer.verify(b"belt and suspenders", &signature, &key).unwrap());
    }

    #[test]
    fn test_hybrid_requires_both_halves() {
        let signer = HybridSigner::new();
        let key = signer.generate_keypair().unwrap();
        let signature = signer.sign(b"m", &key).unwrap();

        let mut broken_classical = signature.clone();
        let last = broken_classical.len() - 1;
        broken_classical[last] ^= 0x01;
        assert!(!signer.verify(b"m", &broken_classical, &key).unwrap());

        let mut broken_pq = signature;
        broken_pq[10] ^= 0x01;
        assert!(!signer.verify(b"m", &broken_pq, &key).unwrap());
    }

    #[test]
    fn test_hybrid_rejects_malformed_key() {
        let signer = HybridSigner::new();
        let bogus = AlgorithmKeyPair::new(vec![0; 10], vec![0; 10]);
        assert!(signer.sign(b"m", &bogus).is_err());
        assert!(signer.verify(b"m", &[0; 3373], &bogus).is_err());
    }
}
