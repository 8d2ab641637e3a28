#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Simulated Signing Capabilities
//!
//! Placeholders for families that have no vetted Rust implementation in this
//! workspace (zero-knowledge, code-based, multivariate). A simulated
//! signature is a SHAKE-256 output keyed by a random secret, so it does bind
//! the message, but it carries none of the named scheme's security. The
//! signer sleeps for a configured cost to mimic the real scheme's latency.
//!
//! Catalog profiles built on these signers must be flagged as simulated.

use std::time::Duration;

use rand::RngCore;
use rand::rngs::OsRng;
use sha3::Shake256;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use subtle::ConstantTimeEq;
use tracing::instrument;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::error::{PrimitiveError, Result};

const DOMAIN: &[u8] = b"esig-simulated-v1";
const SECRET_LEN: usize = 32;
const FINGERPRINT_LEN: usize = 32;

/// A SHAKE-256 placeholder standing in for an unimplemented scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedSigner {
    name: &'static str,
    signature_len: usize,
    emulated_cost: Duration,
}

impl SimulatedSigner {
    /// Creates a placeholder named `name` producing `signature_len` bytes
    /// and taking at least `emulated_cost` per signature.
    #[must_use]
    pub const fn new(name: &'static str, signature_len: usize, emulated_cost: Duration) -> Self {
        Self { name, signature_len, emulated_cost }
    }

    /// Simulated zero-knowledge (STARK-style) signer.
    #[must_use]
    pub const fn zk_stark() -> Self {
        Self::new("SIM-ZK-STARK", 4096, Duration::from_millis(8))
    }

    /// Simulated code-based (Classic McEliece-style) signer.
    #[must_use]
    pub const fn classic_mceliece() -> Self {
        Self::new("SIM-CLASSIC-MCELIECE", 256, Duration::from_millis(3))
    }

    /// Simulated multivariate (UOV-style) signer.
    #[must_use]
    pub const fn uov() -> Self {
        Self::new("SIM-UOV", 96, Duration::from_millis(1))
    }

    /// Output length in bytes.
    #[must_use]
    pub const fn signature_len(&self) -> usize {
        self.signature_len
    }

    /// Minimum time spent per signature.
    #[must_use]
    pub const fn emulated_cost(&self) -> Duration {
        self.emulated_cost
    }

    fn tag(&self, secret: &[u8], message: &[u8]) -> Vec<u8> {
        let mut hasher = Shake256::default();
        hasher.update(DOMAIN);
        hasher.update(self.name.as_bytes());
        hasher.update(&(secret.len() as u64).to_le_bytes());
        hasher.update(secret);
        hasher.update(message);
        let mut out = vec![0u8; self.signature_len];
        hasher.finalize_xof().read(&mut out);
        out
    }

    fn fingerprint(secret: &[u8]) -> Vec<u8> {
        let mut hasher = Shake256::default();
        hasher.update(DOMAIN);
        hasher.update(b"fingerprint");
        hasher.update(secret);
        let mut out = vec![0u8; FINGERPRINT_LEN];
        hasher.finalize_xof().read(&mut out);
        out
    }

    fn check_secret(&self, secret: &[u8]) -> Result<()> {
        if secret.len() != SECRET_LEN {
            return Err(PrimitiveError::InvalidKeyLength {
                algorithm: self.name,
                expected: SECRET_LEN,
                actual: secret.len(),
            });
        }
        Ok(())
    }
}

impl SignatureCapability for SimulatedSigner {
    fn algorithm(&self) -> &'static str {
        self.name
    }

    #[instrument(level = "debug", fields(algorithm = self.name))]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        let mut secret = vec![0u8; SECRET_LEN];
        OsRng.try_fill_bytes(&mut secret).map_err(|e| PrimitiveError::KeyGeneration {
            algorithm: self.name,
            reason: e.to_string(),
        })?;
        Ok(AlgorithmKeyPair::new(Self::fingerprint(&secret), secret))
    }

    #[instrument(level = "debug", skip(self, message, key), fields(algorithm = self.name, message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        self.check_secret(key.secret_key())?;
        if !self.emulated_cost.is_zero() {
            std::thread::sleep(self.emulated_cost);
        }
        Ok(self.tag(key.secret_key(), message))
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(algorithm = self.name, signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        self.check_secret(key.secret_key())?;
        if signature.len() != self.signature_len {
            return Ok(false);
        }
        let expected = self.tag(key.secret_key(), message);
        Ok(bool::from(expected.as_slice().ct_eq(signature)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_round_trip() {
        for signer in
            [SimulatedSigner::zk_stark(), SimulatedSigner::classic_mceliece(), SimulatedSigner::uov()]
        {
            let key = signer.generate_keypair().unwrap();
            let signature = signer.sign(b"placeholder", &key).unwrap();
            assert_eq!(signature.len(), signer.signature_len());
            assert!(signer.verify(b"placeholder", &signature, &key).unwrap());
            assert!(!signer.verify(b"placeholdes", &signature, &key).unwrap());
        }
    }

    #[test]
    fn test_simulated_sign_takes_emulated_cost() {
        let signer = SimulatedSigner::new("SIM-SLOW", 16, Duration::from_millis(20));
        let key = signer.generate_keypair().unwrap();
        let started = std::time::Instant::now();
        signer.sign(b"m", &key).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_names_domain_separate_outputs() {
        let key = AlgorithmKeyPair::new(vec![], vec![3u8; SECRET_LEN]);
        let a = SimulatedSigner::new("SIM-A", 32, Duration::ZERO).sign(b"m", &key).unwrap();
        let b = SimulatedSigner::new("SIM-B", 32, Duration::ZERO).sign(b"m", &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_flipped_bit_rejected() {
        let signer = SimulatedSigner::new("SIM-FAST", 48, Duration::ZERO);
        let key = signer.generate_keypair().unwrap();
        let mut signature = signer.sign(b"m", &key).unwrap();
        signature[0] ^= 0x80;
        assert!(!signer.verify(b"m", &signature, &key).unwrap());
    }
}
