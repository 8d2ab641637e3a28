#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Elastisig Core
//!
//! Time-budgeted multi-algorithm signing. Given more milliseconds, the engine
//! runs more, and more diverse, signature algorithms in parallel and binds
//! their outputs into one 64-byte composite.
//!
//! ## Components
//!
//! - [`AlgorithmCatalog`]: registry of algorithm profiles
//! - [`PerformanceCalibrator`]: rolling timing history feeding the catalog
//! - [`Selector`]: picks the subset to run for a time budget
//! - [`SigningOrchestrator`]: runs the subset concurrently with deadlines
//! - [`composite`]: binds component signatures to the message
//! - [`TrustScorer`]: trust score, security level and break estimate
//! - [`KeyStore`]: lazily generated per-algorithm keys
//! - [`SigningEngine`]: owns one of each and exposes `sign`, `plan`,
//!   `verify` and `warm_up`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use esig_core::{EngineConfig, SignOptions, SigningEngine};
//!
//! let engine = SigningEngine::with_standard_catalog(EngineConfig::default())?;
//! engine.warm_up(&["ML-DSA-65", "Ed25519", "HMAC-SHA-512"])?;
//!
//! let options = SignOptions::new(25.0).with_min_algorithms(3);
//! let result = engine.sign(b"firmware image v2.1", &options)?;
//!
//! println!("{} signatures, trust {:.1}, level {}", result.signature_count(),
//!     result.trust_score, result.security_level);
//! println!("composite {}", result.composite);
//! # Ok::<(), esig_core::CoreError>(())
//! ```

/// Adaptive timing calibration.
pub mod calibrator;

/// Algorithm profile registry.
pub mod catalog;

/// Composite signature binding.
pub mod composite;

/// Engine configuration.
pub mod config;

/// Signing engine facade.
pub mod engine;

/// Error types.
pub mod error;

/// In-memory key store.
pub mod keystore;

/// Tracing setup and log sanitization.
pub mod logging;

/// Concurrent signing with deadlines.
pub mod orchestrator;

/// Built-in catalog seeds.
pub mod seed;

/// Time-budgeted algorithm selection.
pub mod selector;

/// JSON form of signing results.
pub mod serialization;

/// Extension traits.
pub mod traits;

/// Trust scoring.
pub mod trust;

/// Shared data types.
pub mod types;

pub use calibrator::PerformanceCalibrator;
pub use catalog::AlgorithmCatalog;
pub use composite::{COMPOSITE_LEN, CompositeSignature};
pub use config::EngineConfig;
pub use engine::{SignOptions, SigningEngine};
pub use error::{CoreError, Result};
pub use keystore::InMemoryKeyStore;
pub use logging::{SigningEvent, init_tracing, init_tracing_with_filter, sanitize_data};
pub use orchestrator::{OrchestrationReport, SigningOrchestrator};
pub use selector::Selector;
pub use serialization::{SerializableSigningResult, from_json, to_json};
pub use traits::KeyStore;
pub use trust::{BreakEstimate, TrustScorer, break_estimate};
pub use types::{
    AlgorithmFamily, AlgorithmKind, AlgorithmProfile, ComponentVerification, FailedAlgorithm,
    SecurityLevel, Selection, SelectionConstraints, SigningMetadata, SigningOutcome,
    SigningResult, TimingEstimate, VerificationReport,
};

/// Library version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
