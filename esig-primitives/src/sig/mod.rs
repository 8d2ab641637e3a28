#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Post-Quantum and Hybrid Signatures
//!
//! ## ML-DSA (FIPS 204)
//! Module-lattice signatures at NIST levels 2, 3 and 5.
//!
//! ## SLH-DSA (FIPS 205)
//! Stateless hash-based signatures. Conservative assumptions, slow signing.
//!
//! ## Hybrid
//! ML-DSA-65 and Ed25519 over the same message, valid only if both verify.

pub mod hybrid;
pub mod ml_dsa;
pub mod slh_dsa;

pub use hybrid::HybridSigner;
pub use ml_dsa::{MlDsaParameterSet, MlDsaSigner};
pub use slh_dsa::{SlhDsaParameterSet, SlhDsaSigner};
