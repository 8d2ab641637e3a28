#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Elastisig - Time-Budgeted Multi-Algorithm Signing
//!
//! A caller hands over a message and a time budget. The engine picks as many,
//! and as diverse, signature algorithms as fit the budget when run in
//! parallel, signs with all of them concurrently and binds the results into
//! one 64-byte composite. Compromising a single algorithm, or a whole
//! mathematical family, does not forge the set.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use elastisig::prelude::*;
//!
//! let engine = SigningEngine::with_standard_catalog(EngineConfig::default())?;
//! let result = engine.sign(b"Document to sign", &SignOptions::new(10.0))?;
//!
//! assert!(result.signature_count() >= 2);
//! assert!(engine.verify(b"Document to sign", &result).is_valid());
//! # Ok::<(), elastisig::CoreError>(())
//! ```
//!
//! ## Constraining the Selection
//!
//! ```rust,no_run
//! use elastisig::prelude::*;
//!
//! let engine = SigningEngine::with_standard_catalog(EngineConfig::for_production())?;
//! let options = SignOptions::new(100.0)
//!     .with_minimum_quantum_bits(128)
//!     .with_must_include("SLH-DSA-SHAKE-128f")
//!     .with_must_exclude("HMAC-SHA-512");
//!
//! let plan = engine.plan(&options)?;
//! println!("would run {:?} in ~{:.1} ms", plan.names(), plan.planned_parallel_time_ms);
//! # Ok::<(), elastisig::CoreError>(())
//! ```
//!
//! ## Simulated Algorithms
//!
//! Zero-knowledge, code-based and multivariate entries in the standard catalog
//! are SHAKE-256 placeholders with `is_simulated` set. They are never selected
//! unless [`SignOptions::with_allow_simulated`] is set.
//!
//! ## Reports
//!
//! ```rust,no_run
//! use elastisig::prelude::*;
//!
//! let engine = SigningEngine::with_standard_catalog(EngineConfig::default())?;
//! let result = engine.sign(b"audit record", &SignOptions::new(5.0))?;
//! let json = to_json(&result)?;
//! let restored = from_json(&json)?;
//! assert_eq!(restored.composite, result.composite);
//! # Ok::<(), elastisig::CoreError>(())
//! ```

pub use esig_core as core;
pub use esig_perf as perf;
pub use esig_primitives as primitives;

pub mod prelude;

// ============================================================================
// Engine
// ============================================================================

pub use esig_core::{
    AlgorithmCatalog, EngineConfig, InMemoryKeyStore, KeyStore, PerformanceCalibrator, Selector,
    SignOptions, SigningEngine, SigningOrchestrator, TrustScorer, VERSION,
};

// ============================================================================
// Types
// ============================================================================

pub use esig_core::{
    AlgorithmFamily, AlgorithmKind, AlgorithmProfile, BreakEstimate, COMPOSITE_LEN,
    ComponentVerification, CompositeSignature, CoreError, FailedAlgorithm,
    OrchestrationReport, Result, SecurityLevel, Selection, SelectionConstraints,
    SigningMetadata, SigningOutcome, SigningResult, TimingEstimate, VerificationReport,
};

// ============================================================================
// Seeds, serialization, logging
// ============================================================================

pub use esig_core::logging::{SigningEvent, init_tracing, init_tracing_with_filter, sanitize_data};
pub use esig_core::seed::{all_profiles, simulated_profiles, standard_profiles};
pub use esig_core::serialization::{SerializableSigningResult, from_json, to_json, to_json_pretty};

// ============================================================================
// Primitives
// ============================================================================

pub use esig_primitives::{
    AlgorithmKeyPair, Ed25519Signer, HmacAlgorithm, HmacSigner, HybridSigner, MlDsaParameterSet,
    MlDsaSigner, PrimitiveError, Secp256k1Signer, SignatureCapability, SimulatedSigner,
    SlhDsaParameterSet, SlhDsaSigner,
};

/// Signs `message` with a throwaway engine over the standard catalog.
///
/// The engine comes back with the result because verification needs the
/// keys in its store. Long-lived callers build one [`SigningEngine`] and
/// reuse it.
///
/// # Errors
/// Any error of [`SigningEngine::sign`].
pub fn sign_once(message: &[u8], target_time_ms: f64) -> Result<(SigningEngine, SigningResult)> {
    let engine = SigningEngine::with_standard_catalog(EngineConfig::default())?;
    let result = engine.sign(message, &SignOptions::new(target_time_ms))?;
    Ok((engine, result))
}
