//! Error types for esig-primitives crate.

/// Errors raised by a signing capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitiveError {
    /// Key generation failed (RNG failure or pairwise consistency failure).
    #[error("Key generation failed for {algorithm}: {reason}")]
    KeyGeneration {
        /// Algorithm name
        algorithm: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// The signing operation itself failed.
    #[error("Signing failed for {algorithm}: {reason}")]
    Signing {
        /// Algorithm name
        algorithm: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// Verification could not be carried out (malformed key or signature).
    #[error("Verification error for {algorithm}: {reason}")]
    Verification {
        /// Algorithm name
        algorithm: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// Key material has the wrong length for the algorithm.
    #[error("Invalid key length for {algorithm}: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Algorithm name
        algorithm: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Provided length in bytes
        actual: usize,
    },

    /// Key material could not be decoded.
    #[error("Invalid key material for {algorithm}: {reason}")]
    InvalidKey {
        /// Algorithm name
        algorithm: &'static str,
        /// Underlying cause
        reason: String,
    },
}

/// Result type alias for esig-primitives operations.
pub type Result<T> = std::result::Result<T, PrimitiveError>;
