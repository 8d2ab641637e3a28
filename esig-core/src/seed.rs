//! Built-in catalog seeds.
//!
//! Timing figures are starting estimates only; the calibrator replaces them
//! with observed values once enough samples exist. Quantum margins follow
//! the usual convention: equal to the classical margin for lattice and
//! hash-based schemes, half of it for elliptic-curve and symmetric ones.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::sync::Arc;

use esig_primitives::{
    Ed25519Signer, HmacAlgorithm, HmacSigner, HybridSigner, MlDsaParameterSet, MlDsaSigner,
    Secp256k1Signer, SignatureCapability, SimulatedSigner, SlhDsaParameterSet, SlhDsaSigner,
};

use crate::types::{AlgorithmFamily, AlgorithmKind, AlgorithmProfile};

fn profile<C>(capability: C, family: AlgorithmFamily, kind: AlgorithmKind) -> AlgorithmProfile
where
    C: SignatureCapability + 'static,
{
    let name = capability.algorithm();
    AlgorithmProfile::new(name, family, kind, Arc::new(capability))
}

fn ml_dsa(set: MlDsaParameterSet, avg: f64, worst: f64, bits: u32, priority: u32) -> AlgorithmProfile {
    profile(MlDsaSigner::new(set), AlgorithmFamily::Lattice, AlgorithmKind::PostQuantum)
        .with_timing(avg, worst)
        .with_security(bits, bits)
        .with_signature_size(set.signature_size())
        .with_priority(priority)
}

fn slh_dsa(set: SlhDsaParameterSet, avg: f64, worst: f64, bits: u32, priority: u32) -> AlgorithmProfile {
    profile(SlhDsaSigner::new(set), AlgorithmFamily::HashBased, AlgorithmKind::PostQuantum)
        .with_timing(avg, worst)
        .with_security(bits, bits)
        .with_signature_size(set.signature_size())
        .with_priority(priority)
}

fn hmac(algorithm: HmacAlgorithm, avg: f64) -> AlgorithmProfile {
    profile(HmacSigner::new(algorithm), AlgorithmFamily::Symmetric, AlgorithmKind::Symmetric)
        .with_timing(avg, 0.1)
        .with_security(256, 128)
        .with_signature_size(64)
        .with_priority(4)
}

fn placeholder(signer: SimulatedSigner, family: AlgorithmFamily, bits: u32) -> AlgorithmProfile {
    let cost_ms = esig_perf::duration_to_ms(signer.emulated_cost());
    let size = signer.signature_len();
    profile(signer, family, AlgorithmKind::PostQuantum)
        .with_timing(cost_ms, cost_ms * 1.5 + 1.0)
        .with_security(bits, bits)
        .with_signature_size(size)
        .with_priority(3)
        .simulated()
}

/// Profiles backed by vetted implementations, in registration order.
///
/// Covers the lattice, hash-based, elliptic-curve, symmetric and hybrid
/// families.
#[must_use]
pub fn standard_profiles() -> Vec<AlgorithmProfile> {
    vec![
        ml_dsa(MlDsaParameterSet::MLDSA44, 0.3, 1.5, 128, 8),
        ml_dsa(MlDsaParameterSet::MLDSA65, 0.5, 2.5, 192, 9),
        ml_dsa(MlDsaParameterSet::MLDSA87, 0.7, 3.5, 256, 8),
        slh_dsa(SlhDsaParameterSet::Shake128f, 15.0, 60.0, 128, 7),
        slh_dsa(SlhDsaParameterSet::Shake128s, 250.0, 800.0, 128, 6),
        slh_dsa(SlhDsaParameterSet::Shake256f, 40.0, 150.0, 256, 7),
        profile(Ed25519Signer::new(), AlgorithmFamily::EllipticCurve, AlgorithmKind::Classical)
            .with_timing(0.05, 0.3)
            .with_security(128, 64)
            .with_signature_size(64)
            .with_priority(6),
        profile(Secp256k1Signer::new(), AlgorithmFamily::EllipticCurve, AlgorithmKind::Classical)
            .with_timing(0.1, 0.5)
            .with_security(128, 64)
            .with_signature_size(64)
            .with_priority(5),
        hmac(HmacAlgorithm::Sha512, 0.01),
        hmac(HmacAlgorithm::Sha3_512, 0.02),
        profile(HybridSigner::new(), AlgorithmFamily::Hybrid, AlgorithmKind::Hybrid)
            .with_timing(0.6, 3.0)
            .with_security(192, 192)
            .with_signature_size(HybridSigner::signature_size())
            .with_priority(9),
    ]
}

/// Placeholder profiles for families without a vetted implementation.
///
/// Every entry has `is_simulated` set and is excluded from selection unless
/// the caller allows simulated algorithms.
#[must_use]
pub fn simulated_profiles() -> Vec<AlgorithmProfile> {
    vec![
        placeholder(SimulatedSigner::zk_stark(), AlgorithmFamily::ZeroKnowledge, 128),
        placeholder(SimulatedSigner::classic_mceliece(), AlgorithmFamily::CodeBased, 256),
        placeholder(SimulatedSigner::uov(), AlgorithmFamily::Multivariate, 128),
    ]
}

/// Standard and simulated profiles together.
#[must_use]
pub fn all_profiles() -> Vec<AlgorithmProfile> {
    let mut profiles = standard_profiles();
    profiles.extend(simulated_profiles());
    profiles
}
