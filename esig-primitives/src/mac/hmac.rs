#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! HMAC Signing Capability
//!
//! HMAC (FIPS 198-1) over SHA-512 or SHA3-512 using the RustCrypto `hmac`
//! crate. Keys are 64 random bytes. The "public key" recorded for a MAC key
//! is the SHA-256 fingerprint of the secret, which lets callers identify the
//! key without revealing it. Tag comparison is constant time.

use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256, Sha512};
use sha3::Sha3_512;
use tracing::instrument;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::error::{PrimitiveError, Result};

/// HMAC-SHA-512 type alias
pub type HmacSha512 = Hmac<Sha512>;

/// HMAC-SHA3-512 type alias
pub type HmacSha3_512 = Hmac<Sha3_512>;

/// HMAC key length in bytes
pub const HMAC_KEY_LEN: usize = 64;

/// Hash function underlying the MAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    /// HMAC-SHA-512
    Sha512,
    /// HMAC-SHA3-512
    Sha3_512,
}

impl HmacAlgorithm {
    /// Canonical algorithm name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha512 => "HMAC-SHA-512",
            Self::Sha3_512 => "HMAC-SHA3-512",
        }
    }
}

/// HMAC signer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HmacSigner {
    algorithm: HmacAlgorithm,
}

impl HmacSigner {
    /// Creates a signer for `algorithm`.
    #[must_use]
    pub const fn new(algorithm: HmacAlgorithm) -> Self {
        Self { algorithm }
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(PrimitiveError::InvalidKeyLength {
                algorithm: self.algorithm.name(),
                expected: HMAC_KEY_LEN,
                actual: 0,
            });
        }
        Ok(())
    }

    fn invalid_key(&self) -> PrimitiveError {
        PrimitiveError::InvalidKey {
            algorithm: self.algorithm.name(),
            reason: "HMAC key rejected".to_string(),
        }
    }
}

/// SHA-256 fingerprint identifying a MAC key.
#[must_use]
pub fn key_fingerprint(key: &[u8]) -> Vec<u8> {
    Sha256::digest(key).to_vec()
}

impl SignatureCapability for HmacSigner {
    fn algorithm(&self) -> &'static str {
        self.algorithm.name()
    }

    #[instrument(level = "debug", fields(algorithm = self.algorithm.name()))]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        let mut secret = vec![0u8; HMAC_KEY_LEN];
        OsRng.try_fill_bytes(&mut secret).map_err(|e| PrimitiveError::KeyGeneration {
            algorithm: self.algorithm.name(),
            reason: e.to_string(),
        })?;
        Ok(AlgorithmKeyPair::new(key_fingerprint(&secret), secret))
    }

    #[instrument(level = "debug", skip(self, message, key), fields(algorithm = self.algorithm.name(), message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        let secret = key.secret_key();
        self.check_key(secret)?;
        let tag = match self.algorithm {
            HmacAlgorithm::Sha512 => {
                let mut mac =
                    HmacSha512::new_from_slice(secret).map_err(|_e| self.invalid_key())?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            HmacAlgorithm::Sha3_512 => {
                let mut mac =
                    HmacSha3_512::new_from_slice(secret).map_err(|_e| self.invalid_key())?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(tag)
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(algorithm = self.algorithm.name(), signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        let secret = key.secret_key();
        self.check_key(secret)?;
        let valid = match self.algorithm {
            HmacAlgorithm::Sha512 => {
                let mut mac =
                    HmacSha512::new_from_slice(secret).map_err(|_e| self.invalid_key())?;
                mac.update(message);
                mac.verify_slice(signature).is_ok()
            }
            HmacAlgorithm::Sha3_512 => {
                let mut mac =
                    HmacSha3_512::new_from_slice(secret).map_err(|_e| self.invalid_key())?;
                mac.update(message);
                mac.verify_slice(signature).is_ok()
            }
        };
        Ok(valid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_tags_are_64_bytes_and_verify() {
        for algorithm in [HmacAlgorithm::Sha512, HmacAlgorithm::Sha3_512] {
            let signer = HmacSigner::new(algorithm);
            let key = signer.generate_keypair().unwrap();
            assert_eq!(key.secret_key().len(), HMAC_KEY_LEN);
            assert_eq!(key.public_key(), key_fingerprint(key.secret_key()).as_slice());

            let tag = signer.sign(b"authenticate", &key).unwrap();
            assert_eq!(tag.len(), 64);
            assert!(signer.verify(b"authenticate", &tag, &key).unwrap());
            assert!(!signer.verify(b"authenticatf", &tag, &key).unwrap());
        }
    }

    #[test]
    fn test_sha2_and_sha3_tags_differ() {
        let key = AlgorithmKeyPair::new(vec![], vec![7u8; HMAC_KEY_LEN]);
        let a = HmacSigner::new(HmacAlgorithm::Sha512).sign(b"m", &key).unwrap();
        let b = HmacSigner::new(HmacAlgorithm::Sha3_512).sign(b"m", &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rfc4231_case_2_sha512() {
        let key = AlgorithmKeyPair::new(vec![], b"Jefe".to_vec());
        let tag = HmacSigner::new(HmacAlgorithm::Sha512)
            .sign(b"what do ya want for nothing?", &key)
            .unwrap();
        let expected = "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
                        9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737";
        let rendered: String = tag.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_empty_key_rejected() {
        let signer = HmacSigner::new(HmacAlgorithm::Sha512);
        let key = AlgorithmKeyPair::new(vec![], vec![]);
        assert!(signer.sign(b"m", &key).is_err());
    }

    #[test]
    fn test_truncated_tag_rejected() {
        let signer = HmacSigner::new(HmacAlgorithm::Sha3_512);
        let key = signer.generate_keypair().unwrap();
        let tag = signer.sign(b"m", &key).unwrap();
        assert!(!signer.verify(b"m", &tag[..32], &key).unwrap());
    }
}
