//! Fundamental types for Elastisig Core.
//!
//! Algorithm profiles and their classification, selection constraints, the
//! outcome of one signing task and the aggregate result of a signing run.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use esig_primitives::SignatureCapability;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::composite::CompositeSignature;
use crate::error::{CoreError, Result};

/// Grouping of algorithms by the hard problem they rest on.
///
/// Algorithms in different families are assumed not to share a breaking
/// technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlgorithmFamily {
    /// Module/structured lattices (ML-DSA)
    Lattice,
    /// Hash-based (SLH-DSA)
    HashBased,
    /// Elliptic-curve discrete log (Ed25519, ECDSA)
    EllipticCurve,
    /// Symmetric primitives (HMAC)
    Symmetric,
    /// Compositions of several families in one signature
    Hybrid,
    /// Zero-knowledge proof systems
    ZeroKnowledge,
    /// Error-correcting codes
    CodeBased,
    /// Multivariate quadratic equations
    Multivariate,
}

impl AlgorithmFamily {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lattice => "lattice",
            Self::HashBased => "hash-based",
            Self::EllipticCurve => "elliptic-curve",
            Self::Symmetric => "symmetric",
            Self::Hybrid => "hybrid",
            Self::ZeroKnowledge => "zero-knowledge",
            Self::CodeBased => "code-based",
            Self::Multivariate => "multivariate",
        }
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse kind of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Believed secure against quantum adversaries
    PostQuantum,
    /// Public-key scheme broken by Shor's algorithm
    Classical,
    /// Keyed MAC, not publicly verifiable
    Symmetric,
    /// Post-quantum and classical combined
    Hybrid,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PostQuantum => "post-quantum",
            Self::Classical => "classical",
            Self::Symmetric => "symmetric",
            Self::Hybrid => "hybrid",
        };
        f.write_str(label)
    }
}

/// Predicted cost of one signing operation, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingEstimate {
    /// Expected time
    pub avg_time_ms: f64,
    /// Upper bound used for timeouts
    pub worst_time_ms: f64,
}

impl TimingEstimate {
    /// Creates an estimate.
    #[must_use]
    pub const fn new(avg_time_ms: f64, worst_time_ms: f64) -> Self {
        Self { avg_time_ms, worst_time_ms }
    }

    /// Checks that both values are finite, non-negative and ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.avg_time_ms.is_finite()
            && self.worst_time_ms.is_finite()
            && self.avg_time_ms >= 0.0
            && self.avg_time_ms <= self.worst_time_ms
    }
}

/// Everything the engine knows about one signature algorithm.
#[derive(Debug, Clone)]
pub struct AlgorithmProfile {
    /// Unique name
    pub name: String,
    /// Hard-problem family
    pub family: AlgorithmFamily,
    /// Coarse kind
    pub kind: AlgorithmKind,
    /// Expected signing time
    pub avg_time_ms: f64,
    /// Signing time bound used for timeouts
    pub worst_time_ms: f64,
    /// Classical security bits
    pub security_bits: u32,
    /// Security bits against a quantum adversary
    pub quantum_bits: u32,
    /// Signature size in bytes
    pub signature_size_bytes: usize,
    /// Relative preference (higher is better)
    pub priority: u32,
    /// Placeholder capability, excluded unless explicitly allowed
    pub is_simulated: bool,
    /// The uniform sign capability
    pub capability: Arc<dyn SignatureCapability>,
}

impl AlgorithmProfile {
    /// Creates a profile with zero cost and security; use the `with_*`
    /// methods to fill it in.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        family: AlgorithmFamily,
        kind: AlgorithmKind,
        capability: Arc<dyn SignatureCapability>,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            kind,
            avg_time_ms: 0.0,
            worst_time_ms: 0.0,
            security_bits: 0,
            quantum_bits: 0,
            signature_size_bytes: 0,
            priority: 1,
            is_simulated: false,
            capability,
        }
    }

    /// Sets the average and worst-case signing time.
    #[must_use]
    pub fn with_timing(mut self, avg_time_ms: f64, worst_time_ms: f64) -> Self {
        self.avg_time_ms = avg_time_ms;
        self.worst_time_ms = worst_time_ms;
        self
    }

    /// Sets classical and quantum security bits.
    #[must_use]
    pub fn with_security(mut self, security_bits: u32, quantum_bits: u32) -> Self {
        self.security_bits = security_bits;
        self.quantum_bits = quantum_bits;
        self
    }

    /// Sets the signature size.
    #[must_use]
    pub fn with_signature_size(mut self, bytes: usize) -> Self {
        self.signature_size_bytes = bytes;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the profile as a simulated placeholder.
    #[must_use]
    pub fn simulated(mut self) -> Self {
        self.is_simulated = true;
        self
    }

    /// Current timing estimate.
    #[must_use]
    pub fn timing(&self) -> TimingEstimate {
        TimingEstimate::new(self.avg_time_ms, self.worst_time_ms)
    }

    /// Whether the quantum margin reaches `threshold_bits`.
    #[must_use]
    pub fn is_quantum_resistant(&self, threshold_bits: u32) -> bool {
        self.quantum_bits >= threshold_bits
    }

    /// Checks the profile invariants.
    ///
    /// # Errors
    /// Returns `InvalidProfile` if the name is empty, contains `:`, `|` or a
    /// control character, or the timing estimate is not finite, negative, or
    /// has `avg > worst`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidProfile {
                name: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if self.name.chars().any(|c| c == ':' || c == '|' || c.is_control()) {
            return Err(CoreError::InvalidProfile {
                name: self.name.clone(),
                reason: "name must not contain ':', '|' or control characters".to_string(),
            });
        }
        if !self.timing().is_valid() {
            return Err(CoreError::InvalidProfile {
                name: self.name.clone(),
                reason: format!(
                    "timing must satisfy 0 <= avg ({}) <= worst ({})",
                    self.avg_time_ms, self.worst_time_ms
                ),
            });
        }
        Ok(())
    }
}

/// Constraints for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConstraints {
    /// Parallel time budget in milliseconds
    pub target_time_ms: f64,
    /// Minimum number of algorithms
    pub min_algorithms: usize,
    /// Maximum number of algorithms
    pub max_algorithms: usize,
    /// Algorithms with fewer quantum bits are dropped
    pub minimum_quantum_bits: u32,
    /// Names that must be selected
    pub must_include: Vec<String>,
    /// Names that must not be selected
    pub must_exclude: Vec<String>,
    /// Rank unseen families above seen ones
    pub prefer_diversity: bool,
    /// Permit simulated placeholders
    pub allow_simulated: bool,
    /// Rank by `priority / avg` instead of `priority / sqrt(avg)`
    pub prioritize_speed: bool,
}

impl SelectionConstraints {
    /// Constraints for `target_time_ms` with between 2 and 16 algorithms,
    /// diversity preferred, no simulated algorithms.
    #[must_use]
    pub fn new(target_time_ms: f64) -> Self {
        Self {
            target_time_ms,
            min_algorithms: 2,
            max_algorithms: 16,
            minimum_quantum_bits: 0,
            must_include: Vec::new(),
            must_exclude: Vec::new(),
            prefer_diversity: true,
            allow_simulated: false,
            prioritize_speed: false,
        }
    }

    /// Sets the minimum count.
    #[must_use]
    pub fn with_min_algorithms(mut self, min: usize) -> Self {
        self.min_algorithms = min;
        self
    }

    /// Sets the maximum count.
    #[must_use]
    pub fn with_max_algorithms(mut self, max: usize) -> Self {
        self.max_algorithms = max;
        self
    }

    /// Sets the quantum-bits floor.
    #[must_use]
    pub fn with_minimum_quantum_bits(mut self, bits: u32) -> Self {
        self.minimum_quantum_bits = bits;
        self
    }

    /// Adds a required algorithm.
    #[must_use]
    pub fn with_must_include(mut self, name: impl Into<String>) -> Self {
        self.must_include.push(name.into());
        self
    }

    /// Adds an excluded algorithm.
    #[must_use]
    pub fn with_must_exclude(mut self, name: impl Into<String>) -> Self {
        self.must_exclude.push(name.into());
        self
    }

    /// Sets the diversity preference.
    #[must_use]
    pub fn with_prefer_diversity(mut self, enabled: bool) -> Self {
        self.prefer_diversity = enabled;
        self
    }

    /// Allows or forbids simulated algorithms.
    #[must_use]
    pub fn with_allow_simulated(mut self, allowed: bool) -> Self {
        self.allow_simulated = allowed;
        self
    }

    /// Sets the speed preference.
    #[must_use]
    pub fn with_prioritize_speed(mut self, enabled: bool) -> Self {
        self.prioritize_speed = enabled;
        self
    }
}

/// The algorithms chosen for one run.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen profiles, in execution and binding order
    pub profiles: Vec<AlgorithmProfile>,
    /// Budget the selection was made for
    pub target_time_ms: f64,
    /// Largest average time among the chosen profiles
    pub planned_parallel_time_ms: f64,
    /// Whether the planned time exceeds the budget
    pub budget_exceeded: bool,
    /// Successful signatures the run needs: the requested minimum, capped
    /// at the number of eligible algorithms
    pub minimum_required: usize,
    /// Soft warnings raised while selecting
    pub warnings: Vec<String>,
}

impl Selection {
    /// Names in selection order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of chosen algorithms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if nothing was chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Result of one algorithm's signing task.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningOutcome {
    /// Algorithm name
    pub algorithm: String,
    /// Whether a signature was produced
    pub success: bool,
    /// Signature bytes on success
    pub signature: Option<Vec<u8>>,
    /// Wall-clock time of the task
    pub elapsed_ms: f64,
    /// Failure reason
    pub error: Option<String>,
    /// The task was abandoned at its deadline
    pub timed_out: bool,
}

impl SigningOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn succeeded(algorithm: impl Into<String>, signature: Vec<u8>, elapsed_ms: f64) -> Self {
        Self {
            algorithm: algorithm.into(),
            success: true,
            signature: Some(signature),
            elapsed_ms,
            error: None,
            timed_out: false,
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failed(algorithm: impl Into<String>, reason: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            algorithm: algorithm.into(),
            success: false,
            signature: None,
            elapsed_ms,
            error: Some(reason.into()),
            timed_out: false,
        }
    }

    /// A task abandoned at its deadline.
    #[must_use]
    pub fn abandoned(algorithm: impl Into<String>, elapsed_ms: f64) -> Self {
        let algorithm = algorithm.into();
        let reason = format!("{algorithm} exceeded its deadline after {elapsed_ms:.1} ms");
        Self { timed_out: true, ..Self::failed(algorithm, reason, elapsed_ms) }
    }
}

/// Coarse, monotone summary of a run's strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    /// Fewer than two algorithms or weak quantum margin
    Basic,
    /// At least two algorithms, 64 quantum bits
    Medium,
    /// At least four algorithms, 128 quantum bits
    High,
    /// At least six algorithms, 128 quantum bits
    Maximum,
    /// At least eight algorithms, 192 quantum bits
    Paranoid,
}

impl SecurityLevel {
    /// Upper-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Maximum => "MAXIMUM",
            Self::Paranoid => "PARANOID",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An algorithm that did not contribute a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAlgorithm {
    /// Algorithm name
    pub algorithm: String,
    /// Failure reason
    pub reason: String,
    /// The task was abandoned at its deadline
    pub timed_out: bool,
}

/// Descriptive data attached to a [`SigningResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningMetadata {
    /// Families of the signing algorithms, in order of first appearance
    pub families_used: Vec<AlgorithmFamily>,
    /// Number of distinct kinds among the signing algorithms
    pub type_diversity: usize,
    /// Sum of signature lengths in bytes
    pub total_signature_size: usize,
    /// Weakest classical margin among the signing algorithms
    pub lowest_security_bits: u32,
    /// Weakest quantum margin among the signing algorithms
    pub lowest_quantum_bits: u32,
    /// Estimated probability that every family is broken
    pub break_probability: f64,
    /// `log2` of [`Self::break_probability`]
    pub break_probability_log2: f64,
    /// Requested budget
    pub target_time_ms: f64,
    /// Planned parallel time of the selection
    pub planned_parallel_time_ms: f64,
    /// Whether the selection exceeded the budget to meet the minimum
    pub budget_exceeded: bool,
    /// Algorithms that failed or timed out
    pub failed_algorithms: Vec<FailedAlgorithm>,
    /// Soft warnings
    pub warnings: Vec<String>,
}

/// Aggregate result of one signing run.
#[derive(Debug, Clone)]
pub struct SigningResult {
    /// Unique id of the request
    pub request_id: Uuid,
    /// Completion time
    pub timestamp: DateTime<Utc>,
    /// Signature per successful algorithm
    pub signatures: HashMap<String, Vec<u8>>,
    /// Successful algorithms in selection order
    pub algorithms_used: Vec<String>,
    /// Wall-clock time of the parallel run
    pub elapsed_ms: f64,
    /// Binding of all component signatures to the message
    pub composite: CompositeSignature,
    /// Reporting heuristic in `[0, 100]`
    pub trust_score: f64,
    /// Coarse level label
    pub security_level: SecurityLevel,
    /// Descriptive metadata
    pub metadata: SigningMetadata,
}

impl SigningResult {
    /// Signature produced by `algorithm`, if it succeeded.
    #[must_use]
    pub fn signature(&self, algorithm: &str) -> Option<&[u8]> {
        self.signatures.get(algorithm).map(Vec::as_slice)
    }

    /// Signatures in selection order.
    pub fn ordered_signatures(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.algorithms_used.iter().filter_map(|name| {
            self.signatures.get(name).map(|sig| (name.as_str(), sig.as_slice()))
        })
    }

    /// Number of successful signatures.
    #[must_use]
    pub fn signature_count(&self) -> usize {
        self.algorithms_used.len()
    }
}

/// Per-component verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVerification {
    /// Algorithm name
    pub algorithm: String,
    /// Whether the component signature verified
    pub valid: bool,
    /// Why verification could not run
    pub error: Option<String>,
}

/// Result of verifying a [`SigningResult`] against a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Components in selection order
    pub components: Vec<ComponentVerification>,
    /// Whether the recomputed composite matches
    pub composite_valid: bool,
}

impl VerificationReport {
    /// `true` when every component and the composite verify.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.composite_valid
            && !self.components.is_empty()
            && self.components.iter().all(|c| c.valid)
    }

    /// Number of components that verified.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.components.iter().filter(|c| c.valid).count()
    }
}
