//! Composite signature binding.
//!
//! Folds every component signature and the message into one 64-byte value.
//! The transcript is
//!
//! ```text
//! len(name_1):name_1:hex(sig_1)|...|len(name_n):name_n:hex(sig_n)|msg:hex(message)
//! ```
//!
//! in selection order, where `len` is the decimal byte length of the name.
//! The prefix keeps the split unique whatever bytes a name contains. The
//! transcript is hashed independently with SHA-512 (SHA-2), SHA3-512
//! (Keccak) and BLAKE3 (extended to 64 bytes) and XOR-folded. The composite
//! stays collision resistant while any one of the three hash designs holds.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::fmt;

use sha2::{Digest, Sha512};
use sha3::Sha3_512;
use subtle::ConstantTimeEq;

use crate::error::{CoreError, Result};

/// Composite length in bytes.
pub const COMPOSITE_LEN: usize = 64;

/// A 64-byte binding of component signatures to a message.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeSignature([u8; COMPOSITE_LEN]);

impl CompositeSignature {
    /// Wraps raw composite bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; COMPOSITE_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a lowercase or uppercase hex string.
    ///
    /// # Errors
    /// `SerializationError` if the input is not 128 hex digits.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded)
            .map_err(|e| CoreError::SerializationError(format!("composite hex: {e}")))?;
        let array: [u8; COMPOSITE_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            CoreError::SerializationError(format!(
                "composite must be {COMPOSITE_LEN} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; COMPOSITE_LEN] {
        &self.0
    }

    /// Lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CompositeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CompositeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeSignature({})", self.to_hex())
    }
}

impl AsRef<[u8]> for CompositeSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Builds the binding transcript.
#[must_use]
pub fn transcript<'a, I>(signatures: I, message: &[u8]) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut out = Vec::new();
    for (name, signature) in signatures {
        out.extend_from_slice(name.len().to_string().as_bytes());
        out.push(b':');
        out.extend_from_slice(name.as_bytes());
        out.push(b':');
        out.extend_from_slice(hex::encode(signature).as_bytes());
        out.push(b'|');
    }
    out.extend_from_slice(b"msg:");
    out.extend_from_slice(hex::encode(message).as_bytes());
    out
}

/// Computes the composite over `signatures` (in order) and `message`.
#[must_use]
pub fn bind<'a, I>(signatures: I, message: &[u8]) -> CompositeSignature
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let transcript = transcript(signatures, message);

    let sha2 = Sha512::digest(&transcript);
    let sha3 = Sha3_512::digest(&transcript);
    let mut blake = [0u8; COMPOSITE_LEN];
    blake3::Hasher::new().update(&transcript).finalize_xof().fill(&mut blake);

    let mut composite = [0u8; COMPOSITE_LEN];
    for (i, byte) in composite.iter_mut().enumerate() {
        let a = sha2.get(i).copied().unwrap_or(0);
        let b = sha3.get(i).copied().unwrap_or(0);
        let c = blake.get(i).copied().unwrap_or(0);
        *byte = a ^ b ^ c;
    }
    CompositeSignature(composite)
}

/// Recomputes the composite and compares it with `expected` in constant time.
#[must_use]
pub fn verify<'a, I>(signatures: I, message: &[u8], expected: &CompositeSignature) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let actual = bind(signatures, message);
    actual.0.ct_eq(&expected.0).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SIGS: [(&str, &[u8]); 2] = [("A", &[0xde, 0xad]), ("B", &[0xbe, 0xef])];

    #[test]
    fn test_transcript_format() {
        let t = transcript(SIGS, b"hi");
        assert_eq!(t, b"1:A:dead|1:B:beef|msg:6869".to_vec());
        assert_eq!(transcript([], b""), b"msg:".to_vec());
    }

    #[test]
    fn test_separator_in_name_cannot_merge_entries() {
        let pair = [("A", &[0xab][..]), ("B", &[0xcd][..])];
        let merged = [("A:ab|B", &[0xcd][..])];
        assert_ne!(transcript(pair, b"m"), transcript(merged, b"m"));
        assert_ne!(bind(pair, b"m"), bind(merged, b"m"));
        assert!(!verify(merged, b"m", &bind(pair, b"m")));

        let prefixed = [("1:A", &[0xab][..])];
        assert_ne!(transcript(prefixed, b"m"), transcript([("A", &[0xab][..])], b"m"));
    }

    #[test]
    fn test_bind_is_deterministic() {
        assert_eq!(bind(SIGS, b"message"), bind(SIGS, b"message"));
    }

    #[test]
    fn test_bind_depends_on_order_message_and_names() {
        let base = bind(SIGS, b"message");
        let reversed = bind([SIGS[1], SIGS[0]], b"message");
        assert_ne!(base, reversed);
        assert_ne!(base, bind(SIGS, b"messagf"));
        assert_ne!(base, bind([("A", &[0xde, 0xad][..]), ("C", &[0xbe, 0xef][..])], b"message"));
    }

    #[test]
    fn test_verify_constant_time_compare() {
        let composite = bind(SIGS, b"m");
        assert!(verify(SIGS, b"m", &composite));
        let mut tampered = *composite.as_bytes();
        tampered[63] ^= 1;
        assert!(!verify(SIGS, b"m", &CompositeSignature::from_bytes(tampered)));
    }

    #[test]
    fn test_hex_round_trip_and_display() {
        let composite = bind(SIGS, b"m");
        let encoded = composite.to_string();
        assert_eq!(encoded.len(), 128);
        assert_eq!(CompositeSignature::from_hex(&encoded).unwrap(), composite);
        assert!(CompositeSignature::from_hex("abcd").is_err());
        assert!(CompositeSignature::from_hex("zz").is_err());
    }

    #[test]
    fn test_single_bit_flip_avalanche() {
        let a = bind([("A", &[0u8; 32][..])], b"m");
        let mut flipped = [0u8; 32];
        flipped[0] = 1;
        let b = bind([("A", &flipped[..])], b"m");
        let differing: u32 = a
            .as_bytes()
            .iter()
            .zip(b.as_bytes())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        assert!(differing > 150 && differing < 362, "differing bits: {differing}");
    }
}
