#![deny(unsafe_code)]
// Test files use unwrap() for simplicity - test failures will show clear panics
#![allow(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Property-based tests for time-budgeted selection
//!
//! ## Properties Tested
//!
//! - **Monotonic budget**: a larger budget never selects fewer algorithms
//! - **Parallel-time bound**: within budget unless the minimum forced otherwise
//! - **Minimum satisfaction**: at least `min(min, eligible)` algorithms
//! - **Cap**: never more than `max_algorithms`
//! - **Determinism**: identical inputs give identical selections

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use esig_core::{
    AlgorithmCatalog, AlgorithmFamily, AlgorithmKind, AlgorithmProfile, EngineConfig,
    SelectionConstraints, Selector,
};
use esig_primitives::SimulatedSigner;
use proptest::prelude::*;

const NAMES: [&str; 12] = [
    "ALG-00", "ALG-01", "ALG-02", "ALG-03", "ALG-04", "ALG-05", "ALG-06", "ALG-07", "ALG-08",
    "ALG-09", "ALG-10", "ALG-11",
];

const FAMILIES: [AlgorithmFamily; 8] = [
    AlgorithmFamily::Lattice,
    AlgorithmFamily::HashBased,
    AlgorithmFamily::EllipticCurve,
    AlgorithmFamily::Symmetric,
    AlgorithmFamily::Hybrid,
    AlgorithmFamily::ZeroKnowledge,
    AlgorithmFamily::CodeBased,
    AlgorithmFamily::Multivariate,
];

#[derive(Debug, Clone)]
struct Shape {
    avg_ms: f64,
    family: usize,
    quantum_bits: u32,
    priority: u32,
}

fn shape() -> impl Strategy<Value = Shape> {
    (0.0f64..100.0, 0usize..FAMILIES.len(), prop::sample::select(vec![0u32, 64, 128, 192]), 1u32..10)
        .prop_map(|(avg_ms, family, quantum_bits, priority)| Shape { avg_ms, family, quantum_bits, priority })
}

fn selector(shapes: &[Shape]) -> Selector {
    let profiles = shapes.iter().zip(NAMES).map(|(s, name)| {
        AlgorithmProfile::new(
            name,
            FAMILIES[s.family],
            AlgorithmKind::PostQuantum,
            Arc::new(SimulatedSigner::new(name, 16, Duration::ZERO)),
        )
        .with_timing(s.avg_ms, s.avg_ms * 2.0)
        .with_security(s.quantum_bits.max(128), s.quantum_bits)
        .with_priority(s.priority)
    });
    let catalog = Arc::new(AlgorithmCatalog::from_profiles(profiles).unwrap());
    Selector::new(catalog, &EngineConfig::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A larger budget never yields fewer algorithms
    #[test]
    fn budget_is_monotone(
        shapes in prop::collection::vec(shape(), 1..12),
        low in 0.0f64..120.0,
        extra in 0.0f64..120.0,
        min in 1usize..4,
        diversity in any::<bool>(),
    ) {
        let selector = selector(&shapes);
        let base = SelectionConstraints::new(low).with_min_algorithms(min).with_prefer_diversity(diversity);
        let small = selector.select(&base).unwrap();
        let large = selector.select(&SelectionConstraints { target_time_ms: low + extra, ..base }).unwrap();
        prop_assert!(large.len() >= small.len(), "{} < {}", large.len(), small.len());
    }

    /// Planned parallel time stays within the budget unless the minimum forced it over
    #[test]
    fn parallel_time_bounded(
        shapes in prop::collection::vec(shape(), 1..12),
        target in 0.0f64..120.0,
        min in 1usize..4,
    ) {
        let selection = selector(&shapes).select(&SelectionConstraints::new(target).with_min_algorithms(min)).unwrap();
        let slowest = selection.profiles.iter().map(|p| p.avg_time_ms).fold(0.0, f64::max);
        prop_assert_eq!(slowest, selection.planned_parallel_time_ms);
        if selection.budget_exceeded {
            prop_assert!(!selection.warnings.is_empty());
        } else {
            prop_assert!(selection.planned_parallel_time_ms <= target);
        }
    }

    /// The effective minimum is always met and the cap always respected
    #[test]
    fn minimum_and_cap_hold(
        shapes in prop::collection::vec(shape(), 1..12),
        target in 0.0f64..120.0,
        min in 1usize..6,
        spread in 0usize..6,
        floor in prop::sample::select(vec![0u32, 64, 128]),
    ) {
        let max = min + spread;
        let eligible = shapes.iter().filter(|s| s.quantum_bits >= floor).count();
        let constraints = SelectionConstraints::new(target)
            .with_min_algorithms(min)
            .with_max_algorithms(max)
            .with_minimum_quantum_bits(floor);
        match selector(&shapes).select(&constraints) {
            Ok(selection) => {
                prop_assert_eq!(selection.minimum_required, min.min(eligible));
                prop_assert!(selection.len() >= selection.minimum_required);
                prop_assert!(selection.len() <= max);
                prop_assert!(selection.profiles.iter().all(|p| p.quantum_bits >= floor));
                let names: HashSet<_> = selection.names().into_iter().collect();
                prop_assert_eq!(names.len(), selection.len());
            }
            Err(_) => prop_assert_eq!(eligible, 0),
        }
    }

    /// Identical inputs produce identical selections
    #[test]
    fn selection_is_deterministic(
        shapes in prop::collection::vec(shape(), 1..12),
        target in 0.0f64..120.0,
        speed in any::<bool>(),
    ) {
        let selector = selector(&shapes);
        let constraints = SelectionConstraints::new(target).with_prioritize_speed(speed);
        let first = selector.select(&constraints).unwrap();
        let second = selector.select(&constraints).unwrap();
        prop_assert_eq!(first.names(), second.names());
    }
}

#[test]
fn test_worked_example_selects_all_four_families() {
    let shapes = [
        Shape { avg_ms: 5.0, family: 0, quantum_bits: 128, priority: 1 },
        Shape { avg_ms: 50.0, family: 1, quantum_bits: 128, priority: 1 },
        Shape { avg_ms: 1.0, family: 2, quantum_bits: 64, priority: 1 },
        Shape { avg_ms: 0.2, family: 3, quantum_bits: 128, priority: 1 },
    ];
    let selection = selector(&shapes).select(&SelectionConstraints::new(60.0)).unwrap();
    assert_eq!(selection.len(), 4);
    assert_eq!(selection.planned_parallel_time_ms, 50.0);
    assert!(!selection.budget_exceeded);
    let families: HashSet<_> = selection.profiles.iter().map(|p| p.family).collect();
    assert_eq!(families.len(), 4);
}

#[test]
fn test_zero_budget_falls_back_to_fastest() {
    let shapes = [
        Shape { avg_ms: 3.0, family: 0, quantum_bits: 128, priority: 9 },
        Shape { avg_ms: 1.0, family: 1, quantum_bits: 128, priority: 1 },
        Shape { avg_ms: 2.0, family: 2, quantum_bits: 128, priority: 1 },
    ];
    let selection = selector(&shapes).select(&SelectionConstraints::new(0.0)).unwrap();
    assert_eq!(selection.names(), vec!["ALG-01", "ALG-02"]);
    assert!(selection.budget_exceeded);
    assert_eq!(selection.warnings.len(), 1);
}
