//! Core traits for the signing engine.
//!
//! Defines the key store seam consumed by the orchestrator and the engine.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::sync::Arc;

use esig_primitives::AlgorithmKeyPair;

use crate::error::Result;
use crate::types::AlgorithmProfile;

/// Source of per-algorithm key material.
///
/// `get_or_create_key` is idempotent and lazily initializing: the first call
/// for an algorithm generates a key through the profile's capability, every
/// later call returns that same key. Under concurrent first calls exactly one
/// caller generates and all callers observe its key.
pub trait KeyStore: Send + Sync {
    /// Returns the key for `profile`, generating it on first use.
    ///
    /// # Errors
    /// `KeyUnavailable` if generation fails.
    fn get_or_create_key(&self, profile: &AlgorithmProfile) -> Result<Arc<AlgorithmKeyPair>>;

    /// Returns the key for `algorithm` if one exists. Never generates.
    fn get_key(&self, algorithm: &str) -> Option<Arc<AlgorithmKeyPair>>;
}
