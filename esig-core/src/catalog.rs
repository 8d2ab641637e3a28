//! Registry of algorithm profiles.
//!
//! The catalog is built once, before the engine starts, and shared behind an
//! `Arc`. After construction the only mutation is the calibrated timing
//! estimate, which lives behind a per-entry lock and is written only by the
//! [`PerformanceCalibrator`](crate::calibrator::PerformanceCalibrator).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::types::{AlgorithmFamily, AlgorithmProfile, TimingEstimate};

#[derive(Debug)]
struct CatalogEntry {
    profile: AlgorithmProfile,
    estimate: RwLock<TimingEstimate>,
}

impl CatalogEntry {
    fn snapshot(&self) -> AlgorithmProfile {
        let estimate = *self.estimate.read();
        let mut profile = self.profile.clone();
        profile.avg_time_ms = estimate.avg_time_ms;
        profile.worst_time_ms = estimate.worst_time_ms;
        profile
    }
}

/// Registry of algorithm profiles keyed by unique name.
///
/// Reads return snapshots that include the latest calibrated timing.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use esig_core::catalog::AlgorithmCatalog;
/// use esig_core::types::{AlgorithmFamily, AlgorithmKind, AlgorithmProfile};
/// use esig_primitives::Ed25519Signer;
///
/// let mut catalog = AlgorithmCatalog::new();
/// catalog.register(
///     AlgorithmProfile::new("Ed25519", AlgorithmFamily::EllipticCurve, AlgorithmKind::Classical,
///         Arc::new(Ed25519Signer::new()))
///         .with_timing(0.05, 0.3),
/// )?;
/// assert!(catalog.register(
///     AlgorithmProfile::new("Ed25519", AlgorithmFamily::EllipticCurve, AlgorithmKind::Classical,
///         Arc::new(Ed25519Signer::new())),
/// ).is_err());
/// assert_eq!(catalog.get("Ed25519")?.avg_time_ms, 0.05);
/// # Ok::<(), esig_core::error::CoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct AlgorithmCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl AlgorithmCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from `profiles`, registering them in order.
    ///
    /// # Errors
    /// Fails on the first duplicate or invalid profile.
    pub fn from_profiles<I>(profiles: I) -> Result<Self>
    where
        I: IntoIterator<Item = AlgorithmProfile>,
    {
        let mut catalog = Self::new();
        for profile in profiles {
            catalog.register(profile)?;
        }
        Ok(catalog)
    }

    /// Adds a profile.
    ///
    /// # Errors
    /// `DuplicateAlgorithm` if the name is taken, `InvalidProfile` if the
    /// profile violates its invariants.
    pub fn register(&mut self, profile: AlgorithmProfile) -> Result<()> {
        profile.validate()?;
        if self.index.contains_key(&profile.name) {
            return Err(CoreError::DuplicateAlgorithm(profile.name));
        }
        debug!(
            algorithm = %profile.name,
            family = %profile.family,
            simulated = profile.is_simulated,
            "registered algorithm"
        );
        self.index.insert(profile.name.clone(), self.entries.len());
        let estimate = RwLock::new(profile.timing());
        self.entries.push(CatalogEntry { profile, estimate });
        Ok(())
    }

    /// Snapshot of the profile registered under `name`.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name.
    pub fn get(&self, name: &str) -> Result<AlgorithmProfile> {
        self.entry(name).map(CatalogEntry::snapshot)
    }

    /// Current timing estimate for `name`.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name.
    pub fn timing(&self, name: &str) -> Result<TimingEstimate> {
        self.entry(name).map(|entry| *entry.estimate.read())
    }

    /// Snapshots of the profiles matching `predicate`, in registration order.
    pub fn list<P>(&self, predicate: P) -> Vec<AlgorithmProfile>
    where
        P: Fn(&AlgorithmProfile) -> bool,
    {
        self.entries.iter().map(CatalogEntry::snapshot).filter(|p| predicate(p)).collect()
    }

    /// Snapshots of every profile, in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<AlgorithmProfile> {
        self.list(|_| true)
    }

    /// Registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.profile.name.as_str()).collect()
    }

    /// Distinct families, in order of first registration.
    #[must_use]
    pub fn families(&self) -> Vec<AlgorithmFamily> {
        let mut families = Vec::new();
        for entry in &self.entries {
            if !families.contains(&entry.profile.family) {
                families.push(entry.profile.family);
            }
        }
        families
    }

    /// Position of `name` in registration order.
    #[must_use]
    pub fn registration_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the timing estimate of `name`. Calibrator only.
    pub(crate) fn update_timing(&self, name: &str, estimate: TimingEstimate) -> Result<()> {
        if !estimate.is_valid() {
            return Err(CoreError::InvalidProfile {
                name: name.to_string(),
                reason: format!(
                    "calibrated timing must satisfy 0 <= avg ({}) <= worst ({})",
                    estimate.avg_time_ms, estimate.worst_time_ms
                ),
            });
        }
        let entry = self.entry(name)?;
        *entry.estimate.write() = estimate;
        Ok(())
    }

    fn entry(&self, name: &str) -> Result<&CatalogEntry> {
        self.index
            .get(name)
            .and_then(|&i| self.entries.get(i))
            .ok_or_else(|| CoreError::AlgorithmNotFound(name.to_string()))
    }
}
