#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! SLH-DSA (FIPS 205) Signing Capability
//!
//! Hash-based signatures from the `fips205` crate. Three SHAKE parameter sets
//! are offered; the `f` variants trade larger signatures for much faster
//! signing than the `s` variant.
//!
//! - **SLH-DSA-SHAKE-128f**: NIST level 1, fast signing
//! - **SLH-DSA-SHAKE-128s**: NIST level 1, small signatures, slow signing
//! - **SLH-DSA-SHAKE-256f**: NIST level 5, fast signing
//!
//! Signing is hedged (fresh randomness mixed into every signature).

use fips205::slh_dsa_shake_128f as shake_128f;
use fips205::slh_dsa_shake_128s as shake_128s;
use fips205::slh_dsa_shake_256f as shake_256f;
use fips205::traits::{SerDes, Signer, Verifier};
use tracing::instrument;

use crate::capability::{AlgorithmKeyPair, SignatureCapability};
use crate::error::{PrimitiveError, Result};

const CONTEXT: &[u8] = b"";

/// SLH-DSA parameter sets supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlhDsaParameterSet {
    /// SLH-DSA-SHAKE-128f
    Shake128f = 1,
    /// SLH-DSA-SHAKE-128s
    Shake128s = 2,
    /// SLH-DSA-SHAKE-256f
    Shake256f = 3,
}

impl SlhDsaParameterSet {
    /// Canonical algorithm name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Shake128f => "SLH-DSA-SHAKE-128f",
            Self::Shake128s => "SLH-DSA-SHAKE-128s",
            Self::Shake256f => "SLH-DSA-SHAKE-256f",
        }
    }

    /// Returns the NIST security level (1-5)
    #[must_use]
    pub const fn nist_level(&self) -> u8 {
        match self {
            Self::Shake128f | Self::Shake128s => 1,
            Self::Shake256f => 5,
        }
    }

    /// Returns the public key size in bytes
    #[must_use]
    pub const fn public_key_size(&self) -> usize {
        match self {
            Self::Shake128f => shake_128f::PK_LEN,
            Self::Shake128s => shake_128s::PK_LEN,
            Self::Shake256f => shake_256f::PK_LEN,
        }
    }

    /// Returns the secret key size in bytes
    #[must_use]
    pub const fn secret_key_size(&self) -> usize {
        match self {
            Self::Shake128f => shake_128f::SK_LEN,
            Self::Shake128s => shake_128s::SK_LEN,
            Self::Shake256f => shake_256f::SK_LEN,
        }
    }

    /// Returns the signature size in bytes
    #[must_use]
    pub const fn signature_size(&self) -> usize {
        match self {
            Self::Shake128f => shake_128f::SIG_LEN,
            Self::Shake128s => shake_128s::SIG_LEN,
            Self::Shake256f => shake_256f::SIG_LEN,
        }
    }
}

macro_rules! slh_dsa_ops {
    ($alias:ident, $module:ident) => {
        pub(crate) mod $alias {
            use fips205::$module as params;
            use super::*;

            pub(crate) fn keygen(name: &'static str) -> Result<AlgorithmKeyPair> {
                let (pk, sk) = params::try_keygen().map_err(|e| PrimitiveError::KeyGeneration {
                    algorithm: name,
                    reason: e.to_string(),
                })?;
                Ok(AlgorithmKeyPair::new(pk.into_bytes().to_vec(), sk.into_bytes().to_vec()))
            }

            pub(crate) fn sign(name: &'static str, message: &[u8], secret_key: &[u8]) -> Result<Vec<u8>> {
                let sk_bytes: [u8; params::SK_LEN] =
                    secret_key.try_into().map_err(|_e| PrimitiveError::InvalidKeyLength {
                        algorithm: name,
                        expected: params::SK_LEN,
                        actual: secret_key.len(),
                    })?;
                let sk = params::PrivateKey::try_from_bytes(&sk_bytes).map_err(|e| {
                    PrimitiveError::InvalidKey { algorithm: name, reason: e.to_string() }
                })?;
                let sig = sk.try_sign(message, CONTEXT, true).map_err(|e| PrimitiveError::Signing {
                    algorithm: name,
                    reason: e.to_string(),
                })?;
                Ok(sig.as_ref().to_vec())
            }

            pub(crate) fn verify(
                name: &'static str,
                message: &[u8],
                signature: &[u8],
                public_key: &[u8],
            ) -> Result<bool> {
                let pk_bytes: [u8; params::PK_LEN] =
                    public_key.try_into().map_err(|_e| PrimitiveError::InvalidKeyLength {
                        algorithm: name,
                        expected: params::PK_LEN,
                        actual: public_key.len(),
                    })?;
                let Ok(sig_bytes) = <[u8; params::SIG_LEN]>::try_from(signature) else {
                    return Ok(false);
                };
                let pk = params::PublicKey::try_from_bytes(&pk_bytes).map_err(|e| {
                    PrimitiveError::Verification { algorithm: name, reason: e.to_string() }
                })?;
                Ok(pk.verify(message, &sig_bytes, CONTEXT))
            }
        }
    };
}

mod ops {
    use super::*;

    slh_dsa_ops!(shake_128f, slh_dsa_shake_128f);
    slh_dsa_ops!(shake_128s, slh_dsa_shake_128s);
    slh_dsa_ops!(shake_256f, slh_dsa_shake_256f);
}

/// SLH-DSA signer for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlhDsaSigner {
    parameter_set: SlhDsaParameterSet,
}

impl SlhDsaSigner {
    /// Creates a signer for `parameter_set`.
    #[must_use]
    pub const fn new(parameter_set: SlhDsaParameterSet) -> Self {
        Self { parameter_set }
    }

    /// The parameter set this signer uses.
    #[must_use]
    pub const fn parameter_set(&self) -> SlhDsaParameterSet {
        self.parameter_set
    }
}

impl SignatureCapability for SlhDsaSigner {
    fn algorithm(&self) -> &'static str {
        self.parameter_set.name()
    }

    #[instrument(level = "debug", fields(parameter_set = ?self.parameter_set))]
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair> {
        let name = self.parameter_set.name();
        match self.parameter_set {
            SlhDsaParameterSet::Shake128f => ops::shake_128f::keygen(name),
            SlhDsaParameterSet::Shake128s => ops::shake_128s::keygen(name),
            SlhDsaParameterSet::Shake256f => ops::shake_256f::keygen(name),
        }
    }

    #[instrument(level = "debug", skip(self, message, key), fields(parameter_set = ?self.parameter_set, message_len = message.len()))]
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>> {
        let name = self.parameter_set.name();
        let sk = key.secret_key();
        match self.parameter_set {
            SlhDsaParameterSet::Shake128f => ops::shake_128f::sign(name, message, sk),
            SlhDsaParameterSet::Shake128s => ops::shake_128s::sign(name, message, sk),
            SlhDsaParameterSet::Shake256f => ops::shake_256f::sign(name, message, sk),
        }
    }

    #[instrument(level = "debug", skip(self, message, signature, key), fields(parameter_set = ?self.parameter_set, signature_len = signature.len()))]
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool> {
        let name = self.parameter_set.name();
        let pk = key.public_key();
        match self.parameter_set {
            SlhDsaParameterSet::Shake128f => ops::shake_128f::verify(name, message, signature, pk),
            SlhDsaParameterSet::Shake128s => ops::shake_128s::verify(name, message, signature, pk),
            SlhDsaParameterSet::Shake256f => ops::shake_256f::verify(name, message, signature, pk),
        }
    }
}
