#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Elastisig Primitives
//!
//! Every signature scheme the engine can run, reduced to one uniform
//! [`SignatureCapability`]. The engine treats each of them as an opaque
//! capability with a name and a sign function; nothing upstream branches on
//! which algorithm it is holding.
//!
//! ## Algorithms
//!
//! ### Post-Quantum (NIST FIPS 204-205)
//!
//! - **sig::ml_dsa**: ML-DSA-44/65/87 via `fips204`
//! - **sig::slh_dsa**: SLH-DSA-SHAKE-128f/128s/256f via `fips205`
//! - **sig::hybrid**: ML-DSA-65 and Ed25519, both required to verify
//!
//! ### Classical
//!
//! - **ec::ed25519**: Ed25519 (RFC 8032) via `ed25519-dalek`
//! - **ec::secp256k1**: ECDSA over secp256k1 via `k256`
//!
//! ### Symmetric
//!
//! - **mac::hmac**: HMAC-SHA-512 and HMAC-SHA3-512 via `hmac`
//!
//! ### Placeholders
//!
//! - **simulated**: SHAKE-256 stand-ins for zero-knowledge, code-based and
//!   multivariate families. Never a substitute for the real scheme.
//!
//! ## Example
//!
//! ```rust
//! use esig_primitives::{Ed25519Signer, SignatureCapability};
//!
//! let signer = Ed25519Signer::new();
//! let key = signer.generate_keypair()?;
//! let signature = signer.sign(b"hello", &key)?;
//! assert!(signer.verify(b"hello", &signature, &key)?);
//! # Ok::<(), esig_primitives::PrimitiveError>(())
//! ```

pub mod capability;
pub mod ec;
pub mod error;
pub mod mac;
pub mod sig;
pub mod simulated;

pub use capability::{AlgorithmKeyPair, SignatureCapability};
pub use ec::{Ed25519Signer, Secp256k1Signer};
pub use error::{PrimitiveError, Result};
pub use mac::{HmacAlgorithm, HmacSigner};
pub use sig::{HybridSigner, MlDsaParameterSet, MlDsaSigner, SlhDsaParameterSet, SlhDsaSigner};
pub use simulated::SimulatedSigner;
