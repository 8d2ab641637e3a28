#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! JSON form of signing results.
//!
//! Signatures are Base64-encoded and kept in selection order; the composite
//! is hex. A decoded result can be handed straight to
//! [`SigningEngine::verify`](crate::engine::SigningEngine::verify).

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_ENGINE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::composite::CompositeSignature;
use crate::error::{CoreError, Result};
use crate::types::{SecurityLevel, SigningMetadata, SigningResult};

/// One component signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableSignature {
    /// Algorithm name
    pub algorithm: String,
    /// Base64-encoded signature
    pub signature: String,
}

/// Serializable form of a [`SigningResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableSigningResult {
    /// Request identifier
    pub request_id: Uuid,
    /// Completion time (RFC 3339)
    pub timestamp: DateTime<Utc>,
    /// Component signatures in selection order
    pub signatures: Vec<SerializableSignature>,
    /// Wall-clock time of the parallel run
    pub elapsed_ms: f64,
    /// Hex-encoded composite
    pub composite: String,
    /// Trust score
    pub trust_score: f64,
    /// Security level label
    pub security_level: SecurityLevel,
    /// Descriptive metadata
    pub metadata: SigningMetadata,
}

impl From<&SigningResult> for SerializableSigningResult {
    fn from(result: &SigningResult) -> Self {
        Self {
            request_id: result.request_id,
            timestamp: result.timestamp,
            signatures: result
                .ordered_signatures()
                .map(|(algorithm, signature)| SerializableSignature {
                    algorithm: algorithm.to_string(),
                    signature: BASE64_ENGINE.encode(signature),
                })
                .collect(),
            elapsed_ms: result.elapsed_ms,
            composite: result.composite.to_hex(),
            trust_score: result.trust_score,
            security_level: result.security_level,
            metadata: result.metadata.clone(),
        }
    }
}

impl TryFrom<SerializableSigningResult> for SigningResult {
    type Error = CoreError;

    fn try_from(serializable: SerializableSigningResult) -> Result<Self> {
        let mut signatures = HashMap::with_capacity(serializable.signatures.len());
        let mut algorithms_used = Vec::with_capacity(serializable.signatures.len());

        for entry in serializable.signatures {
            let bytes = BASE64_ENGINE
                .decode(&entry.signature)
                .map_err(|e| CoreError::SerializationError(format!("{}: {e}", entry.algorithm)))?;
            if signatures.insert(entry.algorithm.clone(), bytes).is_some() {
                return Err(CoreError::SerializationError(format!(
                    "duplicate signature for {}",
                    entry.algorithm
                )));
            }
            algorithms_used.push(entry.algorithm);
        }

        Ok(SigningResult {
            request_id: serializable.request_id,
            timestamp: serializable.timestamp,
            signatures,
            algorithms_used,
            elapsed_ms: serializable.elapsed_ms,
            composite: CompositeSignature::from_hex(&serializable.composite)?,
            trust_score: serializable.trust_score,
            security_level: serializable.security_level,
            metadata: serializable.metadata,
        })
    }
}

/// Serializes a result to JSON.
///
/// # Errors
/// `SerializationError` if encoding fails.
pub fn to_json(result: &SigningResult) -> Result<String> {
    Ok(serde_json::to_string(&SerializableSigningResult::from(result))?)
}

/// Serializes a result to indented JSON.
///
/// # Errors
/// `SerializationError` if encoding fails.
pub fn to_json_pretty(result: &SigningResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SerializableSigningResult::from(result))?)
}

/// Parses a result from JSON.
///
/// # Errors
/// `SerializationError` for malformed JSON, Base64 or composite hex, or a
/// repeated algorithm name.
pub fn from_json(json: &str) -> Result<SigningResult> {
    let serializable: SerializableSigningResult = serde_json::from_str(json)?;
    SigningResult::try_from(serializable)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::composite;

    fn sample() -> SigningResult {
        let message = b"ledger entry 42";
        let algorithms_used = vec!["ML-DSA-65".to_string(), "Ed25519".to_string()];
        let mut signatures = HashMap::new();
        signatures.insert("ML-DSA-65".to_string(), vec![1u8; 40]);
        signatures.insert("Ed25519".to_string(), vec![2u8; 64]);
        let composite = composite::bind(
            algorithms_used.iter().map(|n| (n.as_str(), signatures[n].as_slice())),
            message,
        );
        SigningResult {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            signatures,
            algorithms_used,
            elapsed_ms: 3.25,
            composite,
            trust_score: 42.5,
            security_level: SecurityLevel::Medium,
            metadata: SigningMetadata {
                families_used: vec![],
                type_diversity: 2,
                total_signature_size: 104,
                lowest_security_bits: 128,
                lowest_quantum_bits: 64,
                break_probability: 2f64.powi(-256),
                break_probability_log2: -256.0,
                target_time_ms: 10.0,
                planned_parallel_time_ms: 0.5,
                budget_exceeded: false,
                failed_algorithms: vec![],
                warnings: vec!["note".to_string()],
            },
        }
    }

    #[test]
    fn test_json_preserves_order_and_bytes() {
        let result = sample();
        let json = to_json(&result).unwrap();
        assert!(json.contains(&result.composite.to_hex()));
        assert!(json.contains("\"security_level\":\"MEDIUM\""));

        let decoded = from_json(&json).unwrap();
        assert_eq!(decoded.algorithms_used, result.algorithms_used);
        assert_eq!(decoded.signatures, result.signatures);
        assert_eq!(decoded.composite, result.composite);
        assert_eq!(decoded.request_id, result.request_id);
        assert_eq!(decoded.metadata, result.metadata);
    }

    #[test]
    fn test_signatures_are_base64() {
        let json = to_json_pretty(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = value["signatures"][0]["signature"].as_str().unwrap();
        assert_eq!(BASE64_ENGINE.decode(first).unwrap(), vec![1u8; 40]);
        assert_eq!(value["signatures"][0]["algorithm"], "ML-DSA-65");
    }

    #[test]
    fn test_rejects_bad_base64() {
        let mut serializable = SerializableSigningResult::from(&sample());
        serializable.signatures[0].signature = "***".to_string();
        let err = SigningResult::try_from(serializable).unwrap_err();
        assert!(matches!(err, CoreError::SerializationError(_)));
    }

    #[test]
    fn test_rejects_duplicate_algorithm() {
        let mut serializable = SerializableSigningResult::from(&sample());
        let copy = serializable.signatures[0].clone();
        serializable.signatures.push(copy);
        assert!(SigningResult::try_from(serializable).is_err());
    }

    #[test]
    fn test_rejects_short_composite() {
        let mut serializable = SerializableSigningResult::from(&sample());
        serializable.composite = "abcd".to_string();
        assert!(SigningResult::try_from(serializable).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(from_json("{not json"), Err(CoreError::SerializationError(_))));
    }
}
