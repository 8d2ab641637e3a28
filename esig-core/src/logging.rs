//! # Elastisig Logging Utilities
//!
//! Structured logging for the signing engine built on `tracing`. Nothing in
//! this crate logs raw key or signature bytes; buffers go through
//! [`sanitize_data`], which renders a length and a short BLAKE3 fingerprint.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use esig_core::logging::{init_tracing, sanitize_data};
//!
//! // Installs the global subscriber; call once per process.
//! init_tracing().ok();
//!
//! let signature = vec![0u8; 3309];
//! tracing::info!("produced {}", sanitize_data(&signature));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::types::{SecurityLevel, SigningResult};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "elastisig=info,esig_core=info";

/// Initializes the global tracing subscriber from `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// # Errors
/// `ConfigurationError` if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Initializes the global tracing subscriber with an explicit directive,
/// e.g. `"esig_core=debug"`.
///
/// # Errors
/// `ConfigurationError` if the directive does not parse or a global
/// subscriber is already installed.
pub fn init_tracing_with_filter(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| CoreError::ConfigurationError(format!("invalid log filter: {e}")))?;
    install(filter)
}

fn install(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| CoreError::ConfigurationError(format!("tracing already initialized: {e}")))?;

    info!("Elastisig logging initialized");
    Ok(())
}

/// Renders `data` without revealing its contents.
#[must_use]
pub fn sanitize_data(data: &[u8]) -> SanitizedData<'_> {
    SanitizedData(data)
}

/// Display wrapper returned by [`sanitize_data`].
pub struct SanitizedData<'a>(&'a [u8]);

impl fmt::Display for SanitizedData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 32 {
            write!(f, "[{} bytes]", self.0.len())
        } else {
            let digest = blake3::hash(self.0);
            let fingerprint = hex::encode(digest.as_bytes());
            write!(f, "[{} bytes, hash: {}]", self.0.len(), fingerprint.get(..16).unwrap_or_default())
        }
    }
}

impl fmt::Debug for SanitizedData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Summary of one `sign` call, suitable for structured log sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningEvent {
    /// Request identifier of the signing result
    pub request_id: Uuid,
    /// When the result was produced
    pub timestamp: DateTime<Utc>,
    /// Algorithms the selector chose
    pub selected: usize,
    /// Algorithms that produced a signature
    pub succeeded: usize,
    /// Algorithms that failed or timed out
    pub failed: usize,
    /// Distinct families among the successes
    pub families: usize,
    /// Requested budget
    pub target_time_ms: f64,
    /// Observed wall-clock time
    pub elapsed_ms: f64,
    /// Reported trust score
    pub trust_score: f64,
    /// Reported security level
    pub security_level: SecurityLevel,
    /// Composite in hex
    pub composite: String,
}

impl SigningEvent {
    /// Builds an event from a finished result.
    #[must_use]
    pub fn from_result(result: &SigningResult) -> Self {
        let failed = result.metadata.failed_algorithms.len();
        Self {
            request_id: result.request_id,
            timestamp: result.timestamp,
            selected: result.algorithms_used.len() + failed,
            succeeded: result.algorithms_used.len(),
            failed,
            families: result.metadata.families_used.len(),
            target_time_ms: result.metadata.target_time_ms,
            elapsed_ms: result.elapsed_ms,
            trust_score: result.trust_score,
            security_level: result.security_level,
            composite: result.composite.to_hex(),
        }
    }

    /// Emits the event at info level.
    pub fn emit(&self) {
        info!(
            request_id = %self.request_id,
            selected = self.selected,
            succeeded = self.succeeded,
            failed = self.failed,
            families = self.families,
            target_ms = self.target_time_ms,
            elapsed_ms = self.elapsed_ms,
            trust_score = self.trust_score,
            level = %self.security_level,
            "signing completed"
        );
    }

    /// JSON rendering of the event.
    ///
    /// # Errors
    /// `SerializationError` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_data_small() {
        assert_eq!(sanitize_data(b"short").to_string(), "[5 bytes]");
        assert_eq!(sanitize_data(&[0u8; 32]).to_string(), "[32 bytes]");
    }

    #[test]
    fn test_sanitize_data_large() {
        let data = vec![0xA5u8; 100];
        let rendered = sanitize_data(&data).to_string();
        assert!(rendered.starts_with("[100 bytes, hash: "));
        let hash = rendered.trim_start_matches("[100 bytes, hash: ").trim_end_matches(']');
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!rendered.contains("a5a5"));
    }

    #[test]
    fn test_sanitize_data_distinguishes_inputs() {
        let a = sanitize_data(&[1u8; 64]).to_string();
        let b = sanitize_data(&[2u8; 64]).to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let err = init_tracing_with_filter("esig_core=notalevel").unwrap_err();
        assert!(matches!(err, CoreError::ConfigurationError(_)));
    }
}
