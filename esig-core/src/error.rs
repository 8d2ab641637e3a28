//! Error types for Elastisig Core operations.
//!
//! Per-algorithm failures during a signing run are absorbed into the report;
//! only failures of the whole operation surface as a [`CoreError`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use esig_primitives::PrimitiveError;
use thiserror::Error;

/// Errors that can occur during Elastisig Core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Constraints are contradictory or malformed.
    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),

    /// No registered algorithm survives filtering.
    #[error("No eligible algorithms: {0}")]
    NoEligibleAlgorithms(String),

    /// A single algorithm failed to sign. Recovered per task; surfaces only
    /// from direct capability calls.
    #[error("Algorithm {algorithm} failed to sign: {reason}")]
    AlgorithmSignFailure {
        /// Algorithm name.
        algorithm: String,
        /// Failure reason.
        reason: String,
    },

    /// Fewer signatures succeeded than the run required.
    #[error("Insufficient signatures: {succeeded} succeeded, {required} required ({failed} failed)")]
    InsufficientSignatures {
        /// Successful signatures.
        succeeded: usize,
        /// Required minimum.
        required: usize,
        /// Failed or timed-out tasks.
        failed: usize,
    },

    /// An algorithm name was registered twice.
    #[error("Duplicate algorithm: {0}")]
    DuplicateAlgorithm(String),

    /// No algorithm is registered under the name.
    #[error("Algorithm not found: {0}")]
    AlgorithmNotFound(String),

    /// A profile violates its invariants.
    #[error("Invalid profile for {name}: {reason}")]
    InvalidProfile {
        /// Algorithm name (may be empty).
        name: String,
        /// Violated invariant.
        reason: String,
    },

    /// A key could not be obtained from the key store.
    #[error("Key unavailable for {algorithm}: {reason}")]
    KeyUnavailable {
        /// Algorithm name.
        algorithm: String,
        /// Failure reason.
        reason: String,
    },

    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error from a signing primitive.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A specialized Result type for Elastisig Core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_signatures_message() {
        let err = CoreError::InsufficientSignatures { succeeded: 1, required: 3, failed: 2 };
        assert_eq!(
            err.to_string(),
            "Insufficient signatures: 1 succeeded, 3 required (2 failed)"
        );
    }

    #[test]
    fn test_primitive_error_converts() {
        let primitive = PrimitiveError::InvalidKey { algorithm: "Ed25519", reason: "bad".into() };
        let err: CoreError = primitive.clone().into();
        assert!(matches!(err, CoreError::Primitive(inner) if inner == primitive));
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<u32>("not json");
        let Err(json_err) = parse else { return };
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::SerializationError(_)));
    }
}
