#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Classical Elliptic-Curve Signatures
//!
//! - **Ed25519** (RFC 8032) via `ed25519-dalek`
//! - **ECDSA secp256k1** via `k256`
//!
//! Both provide roughly 128 bits of classical security and no meaningful
//! resistance to a quantum adversary.

pub mod ed25519;
pub mod secp256k1;

pub use ed25519::Ed25519Signer;
pub use secp256k1::Secp256k1Signer;
