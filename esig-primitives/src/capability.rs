#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! The uniform signing capability every catalog entry carries.
//!
//! The engine never branches on algorithm identity: a post-quantum lattice
//! scheme, an elliptic-curve scheme, a keyed MAC and a simulated placeholder
//! all present the same three operations.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::Result;

/// Key material for one algorithm.
///
/// The public half is what a verifier needs; for symmetric constructions it is
/// a fingerprint of the secret rather than a verification key. The secret half
/// is zeroized on drop and deliberately not `Clone`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AlgorithmKeyPair {
    #[zeroize(skip)]
    public_key: Vec<u8>,
    secret_key: Zeroizing<Vec<u8>>,
}

impl AlgorithmKeyPair {
    /// Wraps raw key material.
    #[must_use]
    pub fn new(public_key: Vec<u8>, secret_key: Vec<u8>) -> Self {
        Self { public_key, secret_key: Zeroizing::new(secret_key) }
    }

    /// Public (or fingerprint) bytes.
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Secret key bytes.
    ///
    /// # Security Warning
    /// Do not copy or log these bytes.
    #[must_use]
    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }
}

impl fmt::Debug for AlgorithmKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmKeyPair")
            .field("public_key_len", &self.public_key.len())
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for AlgorithmKeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
            && bool::from(self.secret_key.as_slice().ct_eq(other.secret_key.as_slice()))
    }
}

impl Eq for AlgorithmKeyPair {}

/// A signature algorithm reduced to the operations the engine needs.
///
/// Implementations must be shareable across the signing threads.
pub trait SignatureCapability: Send + Sync + fmt::Debug {
    /// Canonical algorithm name, e.g. `"ML-DSA-65"`.
    fn algorithm(&self) -> &'static str;

    /// Generates fresh key material.
    ///
    /// # Errors
    /// Returns an error if randomness is unavailable or the keypair fails its
    /// consistency check.
    fn generate_keypair(&self) -> Result<AlgorithmKeyPair>;

    /// Signs `message` with the secret half of `key`.
    ///
    /// # Errors
    /// Returns an error if the key is malformed or the primitive fails.
    fn sign(&self, message: &[u8], key: &AlgorithmKeyPair) -> Result<Vec<u8>>;

    /// Checks `signature` over `message` against `key`.
    ///
    /// Returns `Ok(false)` for a well-formed but invalid signature.
    ///
    /// # Errors
    /// Returns an error if the key or signature cannot be decoded.
    fn verify(&self, message: &[u8], signature: &[u8], key: &AlgorithmKeyPair) -> Result<bool>;
}
