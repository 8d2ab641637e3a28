//! Configuration for the Elastisig signing engine.
//!
//! One [`EngineConfig`] governs calibration, timeouts, default selection
//! bounds and the security thresholds used by the selector and trust scorer.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use esig_perf::DEFAULT_WINDOW_CAPACITY;

use crate::error::{CoreError, Result};

/// Engine-wide configuration.
///
/// # Examples
/// ```rust
/// use esig_core::config::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_timeout_margin(2.0)
///     .with_default_min_algorithms(3)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.default_min_algorithms, 3);
///
/// let dev = EngineConfig::for_development();
/// assert!(dev.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Whether observed execution times feed back into the catalog.
    ///
    /// Default: `true`
    pub adaptive_calibration: bool,

    /// Samples retained per algorithm.
    ///
    /// Default: `100`
    pub history_size: usize,

    /// Samples required before an observed estimate replaces the seeded one.
    ///
    /// Default: `3`
    pub min_calibration_samples: usize,

    /// Multiplier applied to an algorithm's worst-case time to form its
    /// timeout.
    ///
    /// Default: `1.5`
    pub timeout_margin: f64,

    /// Fixed slack added to every timeout, in milliseconds.
    ///
    /// Default: `250`
    pub timeout_floor_ms: f64,

    /// Minimum number of algorithms when a request does not say.
    ///
    /// Default: `2`
    pub default_min_algorithms: usize,

    /// Maximum number of algorithms when a request does not say.
    ///
    /// Default: `16`
    pub default_max_algorithms: usize,

    /// Fraction of the budget after which the ranked selection phase stops.
    ///
    /// Default: `0.9`
    pub sufficient_budget_ratio: f64,

    /// Quantum bits at which an algorithm counts as quantum resistant.
    ///
    /// Default: `128`
    pub quantum_resistant_bits: u32,

    /// Classical bits at which an algorithm counts as high security.
    ///
    /// Default: `192`
    pub high_security_bits: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            adaptive_calibration: true,
            history_size: DEFAULT_WINDOW_CAPACITY,
            min_calibration_samples: 3,
            timeout_margin: 1.5,
            timeout_floor_ms: 250.0,
            default_min_algorithms: 2,
            default_max_algorithms: 16,
            sufficient_budget_ratio: 0.9,
            quantum_resistant_bits: 128,
            high_security_bits: 192,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for development: generous timeouts, quick calibration.
    #[must_use]
    pub fn for_development() -> Self {
        Self::default()
            .with_timeout_margin(4.0)
            .with_timeout_floor_ms(2_000.0)
            .with_min_calibration_samples(1)
    }

    /// Configuration for production: stricter minimum and slower-moving
    /// calibration.
    #[must_use]
    pub fn for_production() -> Self {
        Self::default().with_default_min_algorithms(3).with_min_calibration_samples(10)
    }

    /// Enable or disable adaptive calibration.
    #[must_use]
    pub fn with_adaptive_calibration(mut self, enabled: bool) -> Self {
        self.adaptive_calibration = enabled;
        self
    }

    /// Set the per-algorithm history size.
    #[must_use]
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// Set the sample count needed before estimates are replaced.
    #[must_use]
    pub fn with_min_calibration_samples(mut self, samples: usize) -> Self {
        self.min_calibration_samples = samples;
        self
    }

    /// Set the timeout multiplier.
    #[must_use]
    pub fn with_timeout_margin(mut self, margin: f64) -> Self {
        self.timeout_margin = margin;
        self
    }

    /// Set the fixed timeout slack in milliseconds.
    #[must_use]
    pub fn with_timeout_floor_ms(mut self, floor_ms: f64) -> Self {
        self.timeout_floor_ms = floor_ms;
        self
    }

    /// Set the default minimum algorithm count.
    #[must_use]
    pub fn with_default_min_algorithms(mut self, min: usize) -> Self {
        self.default_min_algorithms = min;
        self
    }

    /// Set the default maximum algorithm count.
    #[must_use]
    pub fn with_default_max_algorithms(mut self, max: usize) -> Self {
        self.default_max_algorithms = max;
        self
    }

    /// Set the budget fraction that ends the ranked phase.
    #[must_use]
    pub fn with_sufficient_budget_ratio(mut self, ratio: f64) -> Self {
        self.sufficient_budget_ratio = ratio;
        self
    }

    /// Set the quantum-resistance threshold in bits.
    #[must_use]
    pub fn with_quantum_resistant_bits(mut self, bits: u32) -> Self {
        self.quantum_resistant_bits = bits;
        self
    }

    /// Set the high-security threshold in bits.
    #[must_use]
    pub fn with_high_security_bits(mut self, bits: u32) -> Self {
        self.high_security_bits = bits;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if [`EngineConfig::validate`] fails.
    pub fn build(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `history_size` or `min_calibration_samples` is zero
    /// - `min_calibration_samples` exceeds `history_size`
    /// - `timeout_margin` is below 1 or not finite
    /// - `timeout_floor_ms` is negative or not finite
    /// - the default minimum is zero or exceeds the default maximum
    /// - `sufficient_budget_ratio` is outside `(0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.history_size == 0 {
            return Err(CoreError::ConfigurationError(
                "history_size must be at least 1".to_string(),
            ));
        }
        if self.min_calibration_samples == 0 || self.min_calibration_samples > self.history_size {
            return Err(CoreError::ConfigurationError(format!(
                "min_calibration_samples must be in 1..={}",
                self.history_size
            )));
        }
        if !self.timeout_margin.is_finite() || self.timeout_margin < 1.0 {
            return Err(CoreError::ConfigurationError(
                "timeout_margin must be a finite value >= 1.0".to_string(),
            ));
        }
        if !self.timeout_floor_ms.is_finite() || self.timeout_floor_ms < 0.0 {
            return Err(CoreError::ConfigurationError(
                "timeout_floor_ms must be finite and non-negative".to_string(),
            ));
        }
        if self.default_min_algorithms == 0 {
            return Err(CoreError::ConfigurationError(
                "default_min_algorithms must be at least 1".to_string(),
            ));
        }
        if self.default_min_algorithms > self.default_max_algorithms {
            return Err(CoreError::ConfigurationError(
                "default_min_algorithms exceeds default_max_algorithms".to_string(),
            ));
        }
        if !(self.sufficient_budget_ratio > 0.0 && self.sufficient_budget_ratio <= 1.0) {
            return Err(CoreError::ConfigurationError(
                "sufficient_budget_ratio must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Deadline for a task whose profile predicts `worst_time_ms`.
    #[must_use]
    pub fn task_timeout_ms(&self, worst_time_ms: f64) -> f64 {
        worst_time_ms.max(0.0) * self.timeout_margin + self.timeout_floor_ms
    }
}
