//! Time-budgeted algorithm selection.
//!
//! Given a parallel time budget and constraints, chooses which catalog
//! algorithms to run. Because the selected algorithms run concurrently, the
//! cost of a selection is the *largest* average time among its members, so
//! adding an algorithm no slower than the current maximum is free.
//!
//! ## Phases
//!
//! 1. **Filter** excluded names, algorithms below the quantum-bits floor and
//!    (unless allowed) simulated placeholders.
//! 2. **Seed** with the required algorithms.
//! 3. **Ranked**: repeatedly take the best-ranked candidate that fits the
//!    budget, until the budget is sufficiently used and the minimum is met.
//! 4. **Backfill** candidates that cost nothing extra.
//! 5. **Budget fill** any remaining candidates that still fit, up to the cap.
//! 6. **Minimum fallback**: if still short, add the fastest candidates even
//!    past the budget and raise a warning.
//!
//! Ranking is recomputed after every acceptance: an unseen family (when
//! diversity is preferred), then quantum resistance, then
//! `priority / f(avg)`, then registration order.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::catalog::AlgorithmCatalog;
use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::types::{AlgorithmFamily, AlgorithmProfile, Selection, SelectionConstraints};

/// Cost floor used in the priority ratio so near-free algorithms stay finite.
const MIN_COST_MS: f64 = 0.001;

#[derive(Debug)]
struct Candidate {
    profile: AlgorithmProfile,
    index: usize,
}

#[derive(Debug, Default)]
struct SelectionState {
    chosen: Vec<Candidate>,
    remaining: Vec<Candidate>,
    current_ms: f64,
    families: HashSet<AlgorithmFamily>,
}

impl SelectionState {
    fn accept(&mut self, position: usize) {
        let candidate = self.remaining.remove(position);
        self.current_ms = self.current_ms.max(candidate.profile.avg_time_ms);
        self.families.insert(candidate.profile.family);
        self.chosen.push(candidate);
    }
}

/// Chooses algorithm subsets from a catalog.
#[derive(Debug, Clone)]
pub struct Selector {
    catalog: Arc<AlgorithmCatalog>,
    quantum_resistant_bits: u32,
    sufficient_budget_ratio: f64,
}

impl Selector {
    /// Creates a selector over `catalog` using the thresholds in `config`.
    #[must_use]
    pub fn new(catalog: Arc<AlgorithmCatalog>, config: &EngineConfig) -> Self {
        Self {
            catalog,
            quantum_resistant_bits: config.quantum_resistant_bits,
            sufficient_budget_ratio: config.sufficient_budget_ratio,
        }
    }

    /// Selects algorithms for `constraints`.
    ///
    /// Deterministic for identical catalog state and constraints.
    ///
    /// # Errors
    ///
    /// - `InvalidConstraints` for a negative or NaN budget, `min = 0`,
    ///   `min > max`, a name both required and excluded, more required names
    ///   than the cap, or a required algorithm removed by the filters
    /// - `AlgorithmNotFound` for an unknown required name
    /// - `NoEligibleAlgorithms` when nothing survives filtering
    #[instrument(level = "debug", skip(self, constraints), fields(target_ms = constraints.target_time_ms, min = constraints.min_algorithms, max = constraints.max_algorithms))]
    pub fn select(&self, constraints: &SelectionConstraints) -> Result<Selection> {
        validate_constraints(constraints)?;
        let includes = dedup(&constraints.must_include);
        if includes.len() > constraints.max_algorithms {
            return Err(CoreError::InvalidConstraints(format!(
                "{} required algorithms exceed the maximum of {}",
                includes.len(),
                constraints.max_algorithms
            )));
        }

        let mut state = SelectionState::default();
        for (index, profile) in self.catalog.all().into_iter().enumerate() {
            if constraints.must_exclude.iter().any(|n| *n == profile.name) {
                continue;
            }
            if !self.passes_filters(&profile, constraints) {
                continue;
            }
            state.remaining.push(Candidate { profile, index });
        }

        for name in &includes {
            let position = state.remaining.iter().position(|c| c.profile.name == *name);
            match position {
                Some(position) => state.accept(position),
                None if self.catalog.contains(name) => {
                    return Err(CoreError::InvalidConstraints(format!(
                        "required algorithm {name} is removed by the quantum-bits or simulated filter"
                    )));
                }
                None => return Err(CoreError::AlgorithmNotFound(name.clone())),
            }
        }

        let eligible = state.chosen.len() + state.remaining.len();
        if eligible == 0 {
            return Err(CoreError::NoEligibleAlgorithms(format!(
                "no algorithm with >= {} quantum bits{} remains after exclusions",
                constraints.minimum_quantum_bits,
                if constraints.allow_simulated { "" } else { " (simulated excluded)" }
            )));
        }

        let target = constraints.target_time_ms;
        let cap = constraints.max_algorithms;
        let minimum_required = constraints.min_algorithms.min(eligible);
        let mut warnings = Vec::new();
        if minimum_required < constraints.min_algorithms {
            warnings.push(format!(
                "only {eligible} eligible algorithms; minimum of {} lowered to {minimum_required}",
                constraints.min_algorithms
            ));
        }

        // Ranked phase
        while state.chosen.len() < cap {
            let sufficient = state.current_ms >= target * self.sufficient_budget_ratio
                && state.chosen.len() >= constraints.min_algorithms;
            if sufficient {
                break;
            }
            let current = state.current_ms;
            let Some(position) =
                self.best(&state, constraints, |c| current.max(c.profile.avg_time_ms) <= target)
            else {
                break;
            };
            state.accept(position);
        }

        // Backfill: no increase in parallel time
        while state.chosen.len() < cap {
            let current = state.current_ms;
            let Some(position) =
                self.best(&state, constraints, |c| c.profile.avg_time_ms <= current)
            else {
                break;
            };
            state.accept(position);
        }

        // Budget fill
        while state.chosen.len() < cap {
            let current = state.current_ms;
            let Some(position) =
                self.best(&state, constraints, |c| current.max(c.profile.avg_time_ms) <= target)
            else {
                break;
            };
            state.accept(position);
        }

        // Minimum fallback
        if state.chosen.len() < minimum_required {
            let before = state.chosen.len();
            while state.chosen.len() < minimum_required {
                let Some(position) = fastest(&state.remaining) else {
                    break;
                };
                state.accept(position);
            }
            let message = format!(
                "budget of {target:.3} ms fits {before} algorithms; added {} fastest to reach the minimum of {minimum_required} (planned {:.3} ms)",
                state.chosen.len() - before,
                state.current_ms
            );
            warn!("{message}");
            warnings.push(message);
        }

        let planned_parallel_time_ms =
            state.chosen.iter().map(|c| c.profile.avg_time_ms).fold(0.0, f64::max);
        let budget_exceeded = planned_parallel_time_ms > target;
        let profiles: Vec<AlgorithmProfile> =
            state.chosen.into_iter().map(|c| c.profile).collect();

        debug!(
            selected = profiles.len(),
            planned_ms = planned_parallel_time_ms,
            families = state.families.len(),
            budget_exceeded,
            "selection complete"
        );

        Ok(Selection {
            profiles,
            target_time_ms: target,
            planned_parallel_time_ms,
            budget_exceeded,
            minimum_required,
            warnings,
        })
    }

    fn passes_filters(&self, profile: &AlgorithmProfile, constraints: &SelectionConstraints) -> bool {
        profile.quantum_bits >= constraints.minimum_quantum_bits
            && (constraints.allow_simulated || !profile.is_simulated)
    }

    /// Position in `state.remaining` of the best-ranked candidate satisfying
    /// `fits`.
    fn best<F>(&self, state: &SelectionState, constraints: &SelectionConstraints, fits: F) -> Option<usize>
    where
        F: Fn(&Candidate) -> bool,
    {
        state
            .remaining
            .iter()
            .enumerate()
            .filter(|(_, c)| fits(c))
            .max_by(|(_, a), (_, b)| self.compare(a, b, &state.families, constraints))
            .map(|(position, _)| position)
    }

    /// Orders candidates so that the better one compares greater.
    fn compare(
        &self,
        a: &Candidate,
        b: &Candidate,
        families: &HashSet<AlgorithmFamily>,
        constraints: &SelectionConstraints,
    ) -> Ordering {
        let unseen = |c: &Candidate| constraints.prefer_diversity && !families.contains(&c.profile.family);
        let quantum = |c: &Candidate| c.profile.is_quantum_resistant(self.quantum_resistant_bits);
        let score = |c: &Candidate| priority_score(&c.profile, constraints.prioritize_speed);

        unseen(a)
            .cmp(&unseen(b))
            .then_with(|| quantum(a).cmp(&quantum(b)))
            .then_with(|| score(a).total_cmp(&score(b)))
            .then_with(|| b.index.cmp(&a.index))
    }
}

/// `priority / avg` when speed is prioritized, otherwise
/// `priority / sqrt(avg)`.
#[must_use]
pub fn priority_score(profile: &AlgorithmProfile, prioritize_speed: bool) -> f64 {
    let cost = profile.avg_time_ms.max(MIN_COST_MS);
    let divisor = if prioritize_speed { cost } else { cost.sqrt() };
    f64::from(profile.priority) / divisor
}

fn fastest(candidates: &[Candidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.profile
                .avg_time_ms
                .total_cmp(&b.profile.avg_time_ms)
                .then_with(|| a.index.cmp(&b.index))
        })
        .map(|(position, _)| position)
}

fn dedup(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names.iter().filter(|n| seen.insert(n.as_str())).cloned().collect()
}

fn validate_constraints(constraints: &SelectionConstraints) -> Result<()> {
    let target = constraints.target_time_ms;
    if target.is_nan() || target < 0.0 {
        return Err(CoreError::InvalidConstraints(format!(
            "target time must be a non-negative number, got {target}"
        )));
    }
    if constraints.min_algorithms == 0 {
        return Err(CoreError::InvalidConstraints("min_algorithms must be at least 1".to_string()));
    }
    if constraints.min_algorithms > constraints.max_algorithms {
        return Err(CoreError::InvalidConstraints(format!(
            "min_algorithms ({}) exceeds max_algorithms ({})",
            constraints.min_algorithms, constraints.max_algorithms
        )));
    }
    if let Some(name) = constraints.must_include.iter().find(|n| constraints.must_exclude.contains(n)) {
        return Err(CoreError::InvalidConstraints(format!(
            "{name} is both required and excluded"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::AlgorithmKind;
    use esig_primitives::SimulatedSigner;
    use std::time::Duration;

    fn profile(
        name: &'static str,
        family: AlgorithmFamily,
        avg: f64,
        quantum_bits: u32,
        priority: u32,
    ) -> AlgorithmProfile {
        let kind = if quantum_bits >= 128 { AlgorithmKind::PostQuantum } else { AlgorithmKind::Classical };
        AlgorithmProfile::new(name, family, kind, Arc::new(SimulatedSigner::new(name, 8, Duration::ZERO)))
            .with_timing(avg, avg * 2.0)
            .with_security(quantum_bits.max(128), quantum_bits)
            .with_priority(priority)
    }

    fn selector(profiles: Vec<AlgorithmProfile>) -> Selector {
        let catalog = Arc::new(AlgorithmCatalog::from_profiles(profiles).unwrap());
        Selector::new(catalog, &EngineConfig::default())
    }

    fn abcd() -> Selector {
        selector(vec![
            profile("A", AlgorithmFamily::Lattice, 5.0, 128, 5),
            profile("B", AlgorithmFamily::HashBased, 50.0, 128, 5),
            profile("C", AlgorithmFamily::EllipticCurve, 1.0, 64, 5),
            profile("D", AlgorithmFamily::Symmetric, 0.2, 128, 5),
        ])
    }

    #[test]
    fn test_generous_budget_takes_all_four_families() {
        let selection = abcd().select(&SelectionConstraints::new(60.0)).unwrap();
        assert_eq!(selection.len(), 4);
        assert_eq!(selection.planned_parallel_time_ms, 50.0);
        assert!(!selection.budget_exceeded);
        let families: HashSet<_> = selection.profiles.iter().map(|p| p.family).collect();
        assert_eq!(families.len(), 4);
    }

    #[test]
    fn test_parallel_time_within_budget() {
        let selection = abcd().select(&SelectionConstraints::new(10.0)).unwrap();
        assert_eq!(selection.names().len(), 3);
        assert!(!selection.names().contains(&"B"));
        assert!(selection.planned_parallel_time_ms <= 10.0);
    }

    #[test]
    fn test_tiny_budget_falls_back_to_fastest() {
        let selection = abcd()
            .select(&SelectionConstraints::new(0.01).with_min_algorithms(1))
            .unwrap();
        assert_eq!(selection.names(), vec!["D"]);
        assert!(selection.budget_exceeded);
        assert_eq!(selection.warnings.len(), 1);
    }

    #[test]
    fn test_zero_budget_meets_minimum() {
        let selection = abcd().select(&SelectionConstraints::new(0.0)).unwrap();
        assert_eq!(selection.names(), vec!["D", "C"]);
        assert!(selection.budget_exceeded);
    }

    #[test]
    fn test_minimum_capped_at_eligible() {
        let selection = abcd()
            .select(&SelectionConstraints::new(100.0).with_min_algorithms(6).with_max_algorithms(8))
            .unwrap();
        assert_eq!(selection.len(), 4);
        assert_eq!(selection.minimum_required, 4);
        assert!(!selection.warnings.is_empty());
    }

    #[test]
    fn test_quantum_first_without_diversity() {
        let selection = abcd()
            .select(
                &SelectionConstraints::new(60.0)
                    .with_prefer_diversity(false)
                    .with_min_algorithms(1)
                    .with_max_algorithms(1),
            )
            .unwrap();
        // Quantum-resistant candidates outrank C; among them D has the best ratio.
        assert_eq!(selection.names(), vec!["D"]);
    }

    #[test]
    fn test_diversity_before_duplicates() {
        let selection = selector(vec![
            profile("L1", AlgorithmFamily::Lattice, 1.0, 128, 10),
            profile("L2", AlgorithmFamily::Lattice, 1.0, 128, 10),
            profile("L3", AlgorithmFamily::Lattice, 1.0, 128, 10),
            profile("H", AlgorithmFamily::HashBased, 1.0, 128, 1),
            profile("E", AlgorithmFamily::EllipticCurve, 1.0, 64, 1),
            profile("S", AlgorithmFamily::Symmetric, 1.0, 128, 1),
        ])
        .select(&SelectionConstraints::new(5.0).with_max_algorithms(4))
        .unwrap();
        let families: HashSet<_> = selection.profiles.iter().map(|p| p.family).collect();
        assert_eq!(families.len(), 4);
    }

    #[test]
    fn test_unseen_classical_family_outranks_covered_quantum_family() {
        let profiles = || {
            vec![
                profile("L1", AlgorithmFamily::Lattice, 1.0, 128, 10),
                profile("L2", AlgorithmFamily::Lattice, 1.0, 128, 10),
                profile("E", AlgorithmFamily::EllipticCurve, 1.0, 64, 1),
            ]
        };
        let capped = SelectionConstraints::new(5.0).with_max_algorithms(2);

        let diverse = selector(profiles()).select(&capped).unwrap();
        let names: HashSet<_> = diverse.names().into_iter().collect();
        assert_eq!(names, HashSet::from(["L1", "E"]));

        let quantum_first = selector(profiles()).select(&capped.with_prefer_diversity(false)).unwrap();
        let names: HashSet<_> = quantum_first.names().into_iter().collect();
        assert_eq!(names, HashSet::from(["L1", "L2"]));
    }

    #[test]
    fn test_without_diversity_priority_wins() {
        let selection = selector(vec![
            profile("L1", AlgorithmFamily::Lattice, 1.0, 128, 10),
            profile("L2", AlgorithmFamily::Lattice, 1.0, 128, 10),
            profile("H", AlgorithmFamily::HashBased, 1.0, 128, 1),
        ])
        .select(&SelectionConstraints::new(5.0).with_max_algorithms(2).with_prefer_diversity(false))
        .unwrap();
        assert_eq!(selection.names(), vec!["L1", "L2"]);
    }

    #[test]
    fn test_ties_broken_by_registration_order() {
        let selection = selector(vec![
            profile("first", AlgorithmFamily::Lattice, 1.0, 128, 3),
            profile("second", AlgorithmFamily::Lattice, 1.0, 128, 3),
        ])
        .select(&SelectionConstraints::new(5.0).with_min_algorithms(1).with_max_algorithms(1))
        .unwrap();
        assert_eq!(selection.names(), vec!["first"]);
    }

    #[test]
    fn test_must_include_seeds_selection() {
        let selection = abcd()
            .select(&SelectionConstraints::new(2.0).with_must_include("B"))
            .unwrap();
        assert_eq!(selection.names()[0], "B");
        // B already costs 50 ms so every cheaper algorithm is free.
        assert_eq!(selection.len(), 4);
        assert!(selection.budget_exceeded);
    }

    #[test]
    fn test_must_exclude_and_quantum_floor() {
        let selection = abcd()
            .select(
                &SelectionConstraints::new(60.0)
                    .with_must_exclude("A")
                    .with_minimum_quantum_bits(128),
            )
            .unwrap();
        assert_eq!(selection.len(), 2);
        assert!(!selection.names().contains(&"A"));
        assert!(!selection.names().contains(&"C"));
    }

    #[test]
    fn test_simulated_requires_opt_in() {
        let sim = profile("SIM", AlgorithmFamily::Multivariate, 0.1, 128, 9).simulated();
        let selector = selector(vec![profile("A", AlgorithmFamily::Lattice, 1.0, 128, 1), sim]);

        let without = selector.select(&SelectionConstraints::new(5.0).with_min_algorithms(1)).unwrap();
        assert_eq!(without.names(), vec!["A"]);

        let with = selector
            .select(&SelectionConstraints::new(5.0).with_allow_simulated(true))
            .unwrap();
        assert!(with.names().contains(&"SIM"));
    }

    #[test]
    fn test_invalid_constraints() {
        let s = abcd();
        let invalid = |c: SelectionConstraints| matches!(s.select(&c), Err(CoreError::InvalidConstraints(_)));
        assert!(invalid(SelectionConstraints::new(-1.0)));
        assert!(invalid(SelectionConstraints::new(f64::NAN)));
        assert!(invalid(SelectionConstraints::new(5.0).with_min_algorithms(0)));
        assert!(invalid(SelectionConstraints::new(5.0).with_min_algorithms(3).with_max_algorithms(2)));
        assert!(invalid(SelectionConstraints::new(5.0).with_must_include("A").with_must_exclude("A")));
        assert!(invalid(
            SelectionConstraints::new(5.0)
                .with_min_algorithms(1)
                .with_max_algorithms(1)
                .with_must_include("A")
                .with_must_include("B")
        ));
        assert!(invalid(SelectionConstraints::new(5.0).with_must_include("C").with_minimum_quantum_bits(128)));
    }

    #[test]
    fn test_unknown_include() {
        let result = abcd().select(&SelectionConstraints::new(5.0).with_must_include("Z"));
        assert!(matches!(result, Err(CoreError::AlgorithmNotFound(name)) if name == "Z"));
    }

    #[test]
    fn test_no_eligible_algorithms() {
        let result = abcd().select(&SelectionConstraints::new(5.0).with_minimum_quantum_bits(512));
        assert!(matches!(result, Err(CoreError::NoEligibleAlgorithms(_))));
    }

    #[test]
    fn test_deterministic() {
        let s = abcd();
        let c = SelectionConstraints::new(7.5);
        assert_eq!(s.select(&c).unwrap().names(), s.select(&c).unwrap().names());
    }

    #[test]
    fn test_priority_score() {
        let p = profile("X", AlgorithmFamily::Lattice, 4.0, 128, 8);
        assert_eq!(priority_score(&p, false), 4.0);
        assert_eq!(priority_score(&p, true), 2.0);
        let free = profile("Y", AlgorithmFamily::Lattice, 0.0, 128, 1);
        assert!(priority_score(&free, true).is_finite());
    }
}
