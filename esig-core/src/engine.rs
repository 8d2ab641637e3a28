//! The signing engine facade.
//!
//! [`SigningEngine`] owns one instance of every component: catalog,
//! calibrator, selector, orchestrator, trust scorer and key store. Nothing is
//! process-global; two engines never share state unless given the same key
//! store.
//!
//! ```rust,no_run
//! use esig_core::{EngineConfig, SignOptions, SigningEngine};
//!
//! let engine = SigningEngine::with_standard_catalog(EngineConfig::default())?;
//! let result = engine.sign(b"release manifest", &SignOptions::new(50.0))?;
//! assert!(engine.verify(b"release manifest", &result).is_valid());
//! # Ok::<(), esig_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::calibrator::PerformanceCalibrator;
use crate::catalog::AlgorithmCatalog;
use crate::composite;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::keystore::InMemoryKeyStore;
use crate::logging::{SigningEvent, sanitize_data};
use crate::orchestrator::{OrchestrationReport, SigningOrchestrator};
use crate::seed;
use crate::selector::Selector;
use crate::traits::KeyStore;
use crate::trust::{TrustScorer, break_estimate};
use crate::types::{
    AlgorithmFamily, AlgorithmProfile, ComponentVerification, FailedAlgorithm, Selection,
    SelectionConstraints, SigningMetadata, SigningResult, VerificationReport,
};

/// Caller options for one signing request.
///
/// Unset minimum and maximum counts fall back to the engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SignOptions {
    /// Parallel time budget in milliseconds
    pub target_time_ms: f64,
    /// Minimum algorithm count
    pub min_algorithms: Option<usize>,
    /// Maximum algorithm count
    pub max_algorithms: Option<usize>,
    /// Quantum-bits floor
    pub minimum_quantum_bits: u32,
    /// Permit simulated placeholders
    pub allow_simulated: bool,
    /// Names that must be selected
    pub must_include: Vec<String>,
    /// Names that must not be selected
    pub must_exclude: Vec<String>,
    /// Prefer unseen families
    pub prefer_diversity: bool,
    /// Rank by raw speed
    pub prioritize_speed: bool,
}

impl SignOptions {
    /// Options for a budget of `target_time_ms`.
    #[must_use]
    pub fn new(target_time_ms: f64) -> Self {
        Self {
            target_time_ms,
            min_algorithms: None,
            max_algorithms: None,
            minimum_quantum_bits: 0,
            allow_simulated: false,
            must_include: Vec::new(),
            must_exclude: Vec::new(),
            prefer_diversity: true,
            prioritize_speed: false,
        }
    }

    /// Sets the minimum count.
    #[must_use]
    pub fn with_min_algorithms(mut self, min: usize) -> Self {
        self.min_algorithms = Some(min);
        self
    }

    /// Sets the maximum count.
    #[must_use]
    pub fn with_max_algorithms(mut self, max: usize) -> Self {
        self.max_algorithms = Some(max);
        self
    }

    /// Sets the quantum-bits floor.
    #[must_use]
    pub fn with_minimum_quantum_bits(mut self, bits: u32) -> Self {
        self.minimum_quantum_bits = bits;
        self
    }

    /// Allows or forbids simulated placeholders.
    #[must_use]
    pub fn with_allow_simulated(mut self, allowed: bool) -> Self {
        self.allow_simulated = allowed;
        self
    }

    /// Requires `name`.
    #[must_use]
    pub fn with_must_include(mut self, name: impl Into<String>) -> Self {
        self.must_include.push(name.into());
        self
    }

    /// Excludes `name`.
    #[must_use]
    pub fn with_must_exclude(mut self, name: impl Into<String>) -> Self {
        self.must_exclude.push(name.into());
        self
    }

    /// Enables or disables the diversity preference.
    #[must_use]
    pub fn with_prefer_diversity(mut self, enabled: bool) -> Self {
        self.prefer_diversity = enabled;
        self
    }

    /// Enables or disables speed-first ranking.
    #[must_use]
    pub fn with_prioritize_speed(mut self, enabled: bool) -> Self {
        self.prioritize_speed = enabled;
        self
    }

    /// Resolves the options against `config` defaults.
    #[must_use]
    pub fn to_constraints(&self, config: &EngineConfig) -> SelectionConstraints {
        SelectionConstraints {
            target_time_ms: self.target_time_ms,
            min_algorithms: self.min_algorithms.unwrap_or(config.default_min_algorithms),
            max_algorithms: self.max_algorithms.unwrap_or(config.default_max_algorithms),
            minimum_quantum_bits: self.minimum_quantum_bits,
            must_include: self.must_include.clone(),
            must_exclude: self.must_exclude.clone(),
            prefer_diversity: self.prefer_diversity,
            allow_simulated: self.allow_simulated,
            prioritize_speed: self.prioritize_speed,
        }
    }
}

/// Time-budgeted multi-algorithm signer.
pub struct SigningEngine {
    config: EngineConfig,
    catalog: Arc<AlgorithmCatalog>,
    calibrator: Arc<PerformanceCalibrator>,
    selector: Selector,
    orchestrator: SigningOrchestrator,
    scorer: TrustScorer,
    key_store: Arc<dyn KeyStore>,
}

impl std::fmt::Debug for SigningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningEngine")
            .field("config", &self.config)
            .field("algorithms", &self.catalog.names())
            .finish_non_exhaustive()
    }
}

impl SigningEngine {
    /// Builds an engine over `profiles`.
    ///
    /// # Errors
    /// `ConfigurationError` for an invalid config; `DuplicateAlgorithm` or
    /// `InvalidProfile` for a bad seed.
    pub fn new<I>(profiles: I, key_store: Arc<dyn KeyStore>, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = AlgorithmProfile>,
    {
        config.validate()?;
        let catalog = Arc::new(AlgorithmCatalog::from_profiles(profiles)?);
        let calibrator = Arc::new(PerformanceCalibrator::new(Arc::clone(&catalog), &config));
        let selector = Selector::new(Arc::clone(&catalog), &config);
        let orchestrator =
            SigningOrchestrator::new(Arc::clone(&key_store), Arc::clone(&calibrator), &config);
        let scorer = TrustScorer::new(&config);

        info!(algorithms = catalog.len(), adaptive = config.adaptive_calibration, "signing engine ready");
        Ok(Self { config, catalog, calibrator, selector, orchestrator, scorer, key_store })
    }

    /// Engine over the standard and simulated seeds with an in-memory key
    /// store.
    ///
    /// # Errors
    /// `ConfigurationError` for an invalid config.
    pub fn with_standard_catalog(config: EngineConfig) -> Result<Self> {
        Self::new(seed::all_profiles(), Arc::new(InMemoryKeyStore::new()), config)
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The algorithm catalog.
    #[must_use]
    pub fn catalog(&self) -> &AlgorithmCatalog {
        &self.catalog
    }

    /// The performance calibrator.
    #[must_use]
    pub fn calibrator(&self) -> &PerformanceCalibrator {
        &self.calibrator
    }

    /// The key store.
    #[must_use]
    pub fn key_store(&self) -> &Arc<dyn KeyStore> {
        &self.key_store
    }

    /// Selects algorithms for `options` without signing.
    ///
    /// # Errors
    /// Selection errors: `InvalidConstraints`, `AlgorithmNotFound`,
    /// `NoEligibleAlgorithms`.
    pub fn plan(&self, options: &SignOptions) -> Result<Selection> {
        self.selector.select(&options.to_constraints(&self.config))
    }

    /// Signs `message` with every algorithm selected for `options`.
    ///
    /// Per-algorithm failures are listed in the metadata; the call fails only
    /// when selection fails or fewer than the required minimum succeed.
    ///
    /// # Errors
    /// Selection errors, or `InsufficientSignatures`.
    #[instrument(level = "debug", skip(self, message, options), fields(message = %sanitize_data(message), target_ms = options.target_time_ms))]
    pub fn sign(&self, message: &[u8], options: &SignOptions) -> Result<SigningResult> {
        let selection = self.plan(options)?;
        debug!(selected = ?selection.names(), planned_ms = selection.planned_parallel_time_ms, "selection made");

        let report =
            self.orchestrator.sign(message, &selection.profiles, selection.minimum_required)?;
        let result = self.assemble(message, &selection, report);

        SigningEvent::from_result(&result).emit();
        Ok(result)
    }

    fn assemble(&self, message: &[u8], selection: &Selection, report: OrchestrationReport) -> SigningResult {
        let mut succeeded: Vec<AlgorithmProfile> = Vec::new();
        let mut signatures: HashMap<String, Vec<u8>> = HashMap::new();
        let mut algorithms_used = Vec::new();
        let mut failed_algorithms = Vec::new();

        for (profile, outcome) in selection.profiles.iter().zip(report.outcomes) {
            match outcome.signature {
                Some(signature) if outcome.success => {
                    algorithms_used.push(outcome.algorithm.clone());
                    signatures.insert(outcome.algorithm, signature);
                    succeeded.push(profile.clone());
                }
                _ => failed_algorithms.push(FailedAlgorithm {
                    reason: outcome.error.unwrap_or_else(|| "no signature".to_string()),
                    algorithm: outcome.algorithm,
                    timed_out: outcome.timed_out,
                }),
            }
        }

        let ordered = algorithms_used
            .iter()
            .filter_map(|name| signatures.get(name).map(|sig| (name.as_str(), sig.as_slice())));
        let composite = composite::bind(ordered, message);
        let (trust_score, security_level) = self.scorer.score(&succeeded, report.elapsed_ms);
        let estimate = break_estimate(&succeeded);

        let mut families_used: Vec<AlgorithmFamily> = Vec::new();
        for profile in &succeeded {
            if !families_used.contains(&profile.family) {
                families_used.push(profile.family);
            }
        }
        let kinds: HashSet<_> = succeeded.iter().map(|p| p.kind).collect();

        let metadata = SigningMetadata {
            families_used,
            type_diversity: kinds.len(),
            total_signature_size: signatures.values().map(Vec::len).sum(),
            lowest_security_bits: succeeded.iter().map(|p| p.security_bits).min().unwrap_or(0),
            lowest_quantum_bits: succeeded.iter().map(|p| p.quantum_bits).min().unwrap_or(0),
            break_probability: estimate.probability,
            break_probability_log2: estimate.log2,
            target_time_ms: selection.target_time_ms,
            planned_parallel_time_ms: selection.planned_parallel_time_ms,
            budget_exceeded: selection.budget_exceeded,
            failed_algorithms,
            warnings: selection.warnings.clone(),
        };

        SigningResult {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            signatures,
            algorithms_used,
            elapsed_ms: report.elapsed_ms,
            composite,
            trust_score,
            security_level,
            metadata,
        }
    }

    /// Verifies every component of `result` against `message` with the keys
    /// held by this engine's key store, and recomputes the composite.
    #[instrument(level = "debug", skip(self, message, result), fields(request_id = %result.request_id, components = result.signature_count()))]
    pub fn verify(&self, message: &[u8], result: &SigningResult) -> VerificationReport {
        let components = result
            .algorithms_used
            .iter()
            .map(|name| self.verify_component(name, message, result.signature(name)))
            .collect();
        let composite_valid =
            composite::verify(result.ordered_signatures(), message, &result.composite);
        let report = VerificationReport { components, composite_valid };
        debug!(valid = report.is_valid(), valid_components = report.valid_count(), "verification done");
        report
    }

    fn verify_component(&self, name: &str, message: &[u8], signature: Option<&[u8]>) -> ComponentVerification {
        let outcome = || -> std::result::Result<bool, String> {
            let signature = signature.ok_or("signature missing")?;
            let profile = self.catalog.get(name).map_err(|e| e.to_string())?;
            let key = self.key_store.get_key(name).ok_or("no key held for algorithm")?;
            profile.capability.verify(message, signature, &key).map_err(|e| e.to_string())
        };
        match outcome() {
            Ok(valid) => ComponentVerification { algorithm: name.to_string(), valid, error: None },
            Err(reason) => {
                ComponentVerification { algorithm: name.to_string(), valid: false, error: Some(reason) }
            }
        }
    }

    /// Generates keys for `names` ahead of the first signing request.
    ///
    /// Returns the number of algorithms that now hold a key.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name, `KeyUnavailable` if
    /// generation fails.
    pub fn warm_up<S: AsRef<str>>(&self, names: &[S]) -> Result<usize> {
        for name in names {
            let profile = self.catalog.get(name.as_ref())?;
            self.key_store.get_or_create_key(&profile)?;
        }
        Ok(names.len())
    }

    /// Generates keys for every catalog entry.
    ///
    /// # Errors
    /// `KeyUnavailable` if any generation fails.
    pub fn warm_up_all(&self) -> Result<usize> {
        let names: Vec<String> = self.catalog.names().into_iter().map(str::to_string).collect();
        self.warm_up(&names)
    }
}
