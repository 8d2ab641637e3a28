#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # ML-DSA (FIPS 204) Signing Capability
//!
//! Wraps the pure-Rust `fips204` crate behind [`SignatureCapability`].
//!
//! | Parameter Set | Public Key | Secret Key | Signature | NIST Level |
//! |---------------|------------|------------|-----------|------------|
//! | ML-DSA-44     | 1312       | 2560       | 2420      | 2          |
//! | ML-DSA-65     | 1952       | 4032       | 3309      | 3          |
//! | ML-DSA-87     | 2592       | 4896       | 4627      | 5          |
//!
//! Signatures are produced with an empty context string.

use fips204::{
    ml_dsa_44, ml_dsa_65, ml_dsa_87,
    traits::{SerDes, Signer, Verifier},
};
use tracing::instrument;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::error::{PrimitiveError, Result};

const CONTEXT: &[u8] = b"";

/// ML-DSA parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MlDsaParameterSet {
    /// ML-DSA-44: NIST Level 2
    MLDSA44,
    /// ML-DSA-65: NIST Level 3
    MLDSA65,
    /// ML-DSA-87: NIST Level 5
    MLDSA87,
}

impl MlDsaParameterSet {
    /// Returns the name of the parameter set
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MLDSA44 => "ML-DSA-44",
            Self::MLDSA65 => "ML-DSA-65",
            Self::MLDSA87 => "ML-DSA-87",
        }
    }

    /// Returns the public key size in bytes
    #[must_use]
    pub const fn public_key_size(&self) -> usize {
        match self {
            Self::MLDSA44 => ml_dsa_44::PK_LEN,
            Self::MLDSA65 => ml_dsa_65::PK_LEN,
            Self::MLDSA87 => ml_dsa_87::PK_LEN,
        }
    }

    /// Returns the secret key size in bytes
    #[must_use]
    pub const fn secret_key_size(&self) -> usize {
        match self {
            Self::MLDSA44 => ml_dsa_44::SK_LEN,
            Self::MLDSA65 => ml_dsa_65::SK_LEN,
            Self::MLDSA87 => ml_dsa_87::SK_LEN,
        }
    }

    /// Returns the signature size in bytes
    #[must_use]
    pub const fn signature_size(&self) -> usize {
        match self {
            Self::MLDSA44 => ml_dsa_44::SIG_LEN,
            Self::MLDSA65 => ml_dsa_65::SIG_LEN,
            Self::MLDSA87 => ml_dsa_87::SIG_LEN,
        }
    }
}

/// Expands the same keygen/sign/verify body for each fips204 parameter module.
macro_rules! ml_dsa_ops {
    ($module:ident, $name:expr) => {
        pub(crate) mod $module {
            use super::*;

            pub(crate) fn keygen() -> Result<AlgorithmKeyPair> {
                let (pk, sk) = fips204::$module::try_keygen().map_err(|e| {
                    PrimitiveError::KeyGeneration { algorithm: $name, reason: e.to_string() }
                })?;
                Ok(AlgorithmKeyPair::new(pk.into_bytes().to_vec(), sk.into_bytes().to_vec()))
            }

            pub(crate) fn sign(message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
                let sk_bytes: [u8; fips204::$module::SK_LEN] =
                    secret_key.try_into().map_err(|_e| PrimitiveError::InvalidKeyLength {
                        algorithm: $name,
                        expected: fips204::$module::SK_LEN,
                        actual: secret_key.len(),
                    })?;
                let sk = fips204::$module::PrivateKey::try_from_bytes(sk_bytes).map_err(|e| {
                    PrimitiveError::InvalidKey { algorithm: $name, reason: e.to_string() }
                })?;
                let sig = sk.try_sign(message, CONTEXT).map_err(|e| PrimitiveError::Signing {
                    algorithm: $name,
                    reason: e.to_string(),
                })?;
                Ok(sig.to_vec())
            }

            pub(crate) fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
                let pk_bytes: [u8; fips204::$module::PK_LEN] =
                    public_key.try_into().map_err(|_e| PrimitiveError::InvalidKeyLength {
                        algorithm: $name,
                        expected: fips204::$module::PK_LEN,
                        actual: public_key.len(),
                    })?;
                let Ok(sig_bytes) = <[u8; fips204::$module::SIG_LEN]>::try_from(signature) else {
                    return Ok(false);
                };
                let pk = fips204::$module::PublicKey::try_from_bytes(pk_bytes).map_err(|e| {
                    PrimitiveError::Verification { algorithm: $name, reason: e.to_string() }
                })?;
                Ok(pk.verify(message, &sig_bytes, CONTEXT))
            }
        }
    };
}

mod ops {
    use super::*;

    ml_dsa_ops!(ml_dsa_44, "ML-DSA-44");
    ml_dsa_ops!(ml_dsa_65, "ML-DSA-65");
    ml_dsa_ops!(ml_dsa_87, "ML-DSA-87");
}

/// ML-DSA signer for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MlDsaSigner {
    parameter_set: MlDsaParameterSet,
}

impl MlDsaSigner {
    /// Creates a signer for `parameter_set`.
    #[must_use]
    pub const fn new(parameter_set: MlDsaParameterSet) -> Self {
        Self { parameter_set }
    }

    /// The parameter set this signer uses.
    #[must_use]
    pub const fn parameter_set(&self) -> MlDsaParameterSet {
        self.parameter_set
    }

    pub(crate) fn sign_with_secret(&self, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
        match self.parameter_set {
            MlDsaParameterSet::MLDSA44 => ops::ml_dsa_44::sign(message, secret_key),
            MlDsaParameterSet::MLDSA65 => ops::ml_dsa_65::sign(message, secret_key),
            MlDsaParameterSet::MLDSA87 => ops::ml_dsa_87::sign(message, secret_key),
        }
    }

    pub(crate) fn verify_with_public(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool> {
        match self.parameter_set {
            MlDsaParameterSet::MLDSA44 => ops::ml_dsa_44::verify(message, signature, public_key),
            MlDsaParameterSet::MLDSA65 => ops::ml_dsa_65::verify(message, signature, public_key),
            MlDsaParameterSet::MLDSA87 => ops::ml_dsa_87::verify(message, signature, public_key),
        }
    }
}

impl SignatureCapability for MlDsaSigner {
    fn algorithm(&self) -> &'static str {
        self.parameter_set.name()
    }

    #[instrument(level = "debug", fields(parameter_set = ?self.parameter_set))]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        match self.parameter_set {
            MlDsaParameterSet::MLDSA44 => ops::ml_dsa_44::keygen(),
            MlDsaParameterSet::MLDSA65 => ops::ml_dsa_65::keygen(),
            MlDsaParameterSet::MLDSA87 => ops::ml_dsa_87::keygen(),
        }
    }

    #[instrument(level = "debug", skip(self, message, key), fields(parameter_set = ?self.parameter_set, message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        self.sign_with_secret(message, key.secret_key())
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(parameter_set = ?self.parameter_set, signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        self.verify_with_public(message, signature, key.public_key())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [MlDsaParameterSet; 3] =
        [MlDsaParameterSet::MLDSA44, MlDsaParameterSet::MLDSA65, MlDsaParameterSet::MLDSA87];

    #[test]
    fn test_sign_verify_all_parameter_sets() {
        for parameter_set in ALL {
            let signer = MlDsaSigner::new(parameter_set);
            let key = signer.generate_keypair().unwrap();
            assert_eq!(key.public_key().len(), parameter_set.public_key_size());
            assert_eq!(key.secret_key().len(), parameter_set.secret_key_size());

            let signature = signer.sign(b"ml-dsa message", &key).unwrap();
            assert_eq!(signature.len(), parameter_set.signature_size());
            assert!(signer.verify(b"ml-dsa message", &signature, &key).unwrap());
            assert!(!signer.verify(b"other message", &signature, &key).unwrap());
        }
    }

    #[test]
    fn test_truncated_signature_is_invalid() {
        let signer = MlDsaSigner::new(MlDsaParameterSet::MLDSA44);
        let key = signer.generate_keypair().unwrap();
        let signature = signer.sign(b"msg", &key).unwrap();
        assert!(!signer.verify(b"msg", &signature[..100], &key).unwrap());
    }

    #[test]
    fn test_wrong_secret_key_length_rejected() {
        let signer = MlDsaSigner::new(MlDsaParameterSet::MLDSA65);
        let bogus = AlgorithmKeyPair::new(vec![0; 10], vec![0; 10]);
        let err = signer.sign(b"msg", &bogus).unwrap_err();
        assert!(matches!(
            err,
            PrimitiveError::InvalidKeyLength { algorithm: "ML-DSA-65", expected: 4032, actual: 10 }
        ));
    }
}
