//! Common imports for signing with Elastisig.
//!
//! ```rust
//! use elastisig::prelude::*;
//!
//! let options = SignOptions::new(25.0).with_min_algorithms(3);
//! assert_eq!(options.min_algorithms, Some(3));
//! ```

pub use esig_core::serialization::{from_json, to_json};
pub use esig_core::{
    AlgorithmFamily, AlgorithmProfile, CoreError, EngineConfig, KeyStore, SecurityLevel,
    SignOptions, SigningEngine, SigningResult, VerificationReport,
};
pub use esig_primitives::SignatureCapability;
