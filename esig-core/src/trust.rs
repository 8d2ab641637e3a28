//! Trust scoring and break-probability estimation.
//!
//! The trust score and security level are reporting heuristics. They are
//! computed separately from [`break_estimate`], which states the one
//! quantitative claim the engine makes: with families assumed independent,
//! an attacker must break the strongest member of every family.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::{BTreeMap, HashSet};

use crate::config::EngineConfig;
use crate::types::{AlgorithmFamily, AlgorithmProfile, SecurityLevel};

const COUNT_WEIGHT: f64 = 3.75;
const COUNT_CAP: usize = 8;
const FAMILY_WEIGHT: f64 = 4.0;
const FAMILY_CAP: usize = 5;
const QUANTUM_WEIGHT: f64 = 25.0;
const TIME_WEIGHT: f64 = 10.0;
const TIME_CAP_MS: f64 = 1000.0;
const HIGH_SECURITY_WEIGHT: f64 = 15.0;

/// Probability that every family represented is broken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakEstimate {
    /// Sum over families of the strongest quantum margin, negated
    pub log2: f64,
    /// `2^log2`; underflows to zero for large margins
    pub probability: f64,
}

/// Deterministic trust scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustScorer {
    quantum_resistant_bits: u32,
    high_security_bits: u32,
}

impl Default for TrustScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl TrustScorer {
    /// Creates a scorer with the thresholds in `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            quantum_resistant_bits: config.quantum_resistant_bits,
            high_security_bits: config.high_security_bits,
        }
    }

    /// Trust score in `[0, 100]` and security level for a set of algorithms
    /// that signed in `elapsed_ms`.
    ///
    /// Components: count (up to 30), family diversity (up to 20),
    /// quantum-resistant fraction (up to 25), elapsed time (up to 10) and
    /// high-security fraction (up to 15). An empty set scores zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, selected: &[AlgorithmProfile], elapsed_ms: f64) -> (f64, SecurityLevel) {
        let level = self.security_level(selected);
        if selected.is_empty() {
            return (0.0, level);
        }

        let n = selected.len() as f64;
        let families: HashSet<AlgorithmFamily> = selected.iter().map(|p| p.family).collect();
        let quantum = selected
            .iter()
            .filter(|p| p.is_quantum_resistant(self.quantum_resistant_bits))
            .count() as f64;
        let high = selected.iter().filter(|p| p.security_bits >= self.high_security_bits).count()
            as f64;
        let time = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };

        let score = selected.len().min(COUNT_CAP) as f64 * COUNT_WEIGHT
            + families.len().min(FAMILY_CAP) as f64 * FAMILY_WEIGHT
            + quantum / n * QUANTUM_WEIGHT
            + (time / TIME_CAP_MS).min(1.0) * TIME_WEIGHT
            + high / n * HIGH_SECURITY_WEIGHT;

        (score.clamp(0.0, 100.0), level)
    }

    /// Monotone step function of algorithm count and weakest quantum margin.
    #[must_use]
    pub fn security_level(&self, selected: &[AlgorithmProfile]) -> SecurityLevel {
        let count = selected.len();
        let min_quantum = selected.iter().map(|p| p.quantum_bits).min().unwrap_or(0);
        let strong = self.quantum_resistant_bits;
        let very_strong = self.high_security_bits;

        if count >= 8 && min_quantum >= very_strong {
            SecurityLevel::Paranoid
        } else if count >= 6 && min_quantum >= strong {
            SecurityLevel::Maximum
        } else if count >= 4 && min_quantum >= strong {
            SecurityLevel::High
        } else if count >= 2 && min_quantum >= strong / 2 {
            SecurityLevel::Medium
        } else {
            SecurityLevel::Basic
        }
    }
}

/// Probability that every represented family is broken.
///
/// Per family the strongest quantum margin counts; margins of distinct
/// families add. An empty set yields `log2 = 0` (certain break).
#[must_use]
pub fn break_estimate(selected: &[AlgorithmProfile]) -> BreakEstimate {
    let mut strongest: BTreeMap<AlgorithmFamily, u32> = BTreeMap::new();
    for profile in selected {
        let entry = strongest.entry(profile.family).or_insert(0);
        *entry = (*entry).max(profile.quantum_bits);
    }
    let bits: f64 = strongest.values().map(|&b| f64::from(b)).sum();
    let log2 = -bits;
    BreakEstimate { log2, probability: log2.exp2() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::AlgorithmKind;
    use esig_primitives::SimulatedSigner;
    use std::sync::Arc;
    use std::time::Duration;

    fn profile(family: AlgorithmFamily, security: u32, quantum: u32) -> AlgorithmProfile {
        AlgorithmProfile::new(
            "P",
            family,
            AlgorithmKind::PostQuantum,
            Arc::new(SimulatedSigner::new("P", 8, Duration::ZERO)),
        )
        .with_security(security, quantum)
    }

    #[test]
    fn test_empty_selection() {
        let scorer = TrustScorer::default();
        assert_eq!(scorer.score(&[], 10.0), (0.0, SecurityLevel::Basic));
        let estimate = break_estimate(&[]);
        assert_eq!(estimate.log2, 0.0);
        assert_eq!(estimate.probability, 1.0);
    }

    #[test]
    fn test_score_components() {
        let scorer = TrustScorer::default();
        let selected = vec![
            profile(AlgorithmFamily::Lattice, 192, 192),
            profile(AlgorithmFamily::EllipticCurve, 128, 64),
        ];
        let (score, level) = scorer.score(&selected, 500.0);
        // 2*3.75 + 2*4 + 0.5*25 + 0.5*10 + 0.5*15
        assert!((score - 40.5).abs() < 1e-9);
        assert_eq!(level, SecurityLevel::Medium);
    }

    #[test]
    fn test_score_is_capped() {
        let scorer = TrustScorer::default();
        let families = [
            AlgorithmFamily::Lattice,
            AlgorithmFamily::HashBased,
            AlgorithmFamily::Symmetric,
            AlgorithmFamily::CodeBased,
            AlgorithmFamily::Multivariate,
            AlgorithmFamily::ZeroKnowledge,
        ];
        let selected: Vec<_> =
            (0..12).map(|i| profile(families[i % families.len()], 256, 256)).collect();
        let (score, level) = scorer.score(&selected, 1e9);
        assert_eq!(score, 100.0);
        assert_eq!(level, SecurityLevel::Paranoid);
    }

    #[test]
    fn test_security_level_steps() {
        let scorer = TrustScorer::default();
        let many = |n: usize, q: u32| -> Vec<_> {
            (0..n).map(|_| profile(AlgorithmFamily::Lattice, 256, q)).collect()
        };
        assert_eq!(scorer.security_level(&many(1, 256)), SecurityLevel::Basic);
        assert_eq!(scorer.security_level(&many(2, 64)), SecurityLevel::Medium);
        assert_eq!(scorer.security_level(&many(3, 32)), SecurityLevel::Basic);
        assert_eq!(scorer.security_level(&many(4, 128)), SecurityLevel::High);
        assert_eq!(scorer.security_level(&many(6, 128)), SecurityLevel::Maximum);
        assert_eq!(scorer.security_level(&many(8, 128)), SecurityLevel::Maximum);
        assert_eq!(scorer.security_level(&many(8, 192)), SecurityLevel::Paranoid);
    }

    #[test]
    fn test_level_monotone_in_count() {
        let scorer = TrustScorer::default();
        let mut previous = SecurityLevel::Basic;
        for n in 1..12 {
            let selected: Vec<_> = (0..n).map(|_| profile(AlgorithmFamily::Lattice, 256, 256)).collect();
            let level = scorer.security_level(&selected);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_break_estimate_uses_strongest_per_family() {
        let selected = vec![
            profile(AlgorithmFamily::Lattice, 128, 128),
            profile(AlgorithmFamily::Lattice, 256, 256),
            profile(AlgorithmFamily::EllipticCurve, 128, 64),
        ];
        let estimate = break_estimate(&selected);
        assert_eq!(estimate.log2, -320.0);
        assert_eq!(estimate.probability, (-320.0f64).exp2());
    }

    #[test]
    fn test_score_deterministic() {
        let scorer = TrustScorer::default();
        let selected = vec![profile(AlgorithmFamily::HashBased, 128, 128)];
        assert_eq!(scorer.score(&selected, 3.0), scorer.score(&selected, 3.0));
    }
}
