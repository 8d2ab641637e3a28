#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Keyed Message Authentication
//!
//! Symmetric members of the catalog. A MAC is not publicly verifiable; the
//! engine treats it as one more independent "signature" whose verification
//! requires the holder's key store.

pub mod hmac;

pub use hmac::{HmacAlgorithm, HmacSigner};
