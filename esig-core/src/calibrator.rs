//! Rolling execution-time calibration.
//!
//! Each algorithm owns a bounded [`SampleWindow`] behind its own lock, so
//! concurrent recordings for different algorithms never contend. Once a
//! window holds enough samples its mean and maximum replace the catalog's
//! estimate for that algorithm.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;

use esig_perf::{SampleWindow, WindowStatistics};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::catalog::AlgorithmCatalog;
use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::types::TimingEstimate;

/// Per-algorithm timing history feeding the catalog.
#[derive(Debug)]
pub struct PerformanceCalibrator {
    catalog: Arc<AlgorithmCatalog>,
    windows: HashMap<String, Mutex<SampleWindow>>,
    min_samples: usize,
    enabled: bool,
}

impl PerformanceCalibrator {
    /// Creates a calibrator with one window per catalog entry.
    #[must_use]
    pub fn new(catalog: Arc<AlgorithmCatalog>, config: &EngineConfig) -> Self {
        let windows = catalog
            .names()
            .into_iter()
            .map(|name| (name.to_string(), Mutex::new(SampleWindow::new(config.history_size))))
            .collect();
        Self {
            catalog,
            windows,
            min_samples: config.min_calibration_samples.max(1),
            enabled: config.adaptive_calibration,
        }
    }

    /// Whether recordings are kept.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records one observed execution time.
    ///
    /// Ignored when calibration is disabled or the sample is not a finite,
    /// non-negative number. Once the window holds the configured minimum the
    /// catalog estimate becomes `(mean, max)` of the window.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for a name the catalog does not know.
    pub fn record(&self, name: &str, elapsed_ms: f64) -> Result<()> {
        let window = self.window(name)?;
        if !self.enabled {
            return Ok(());
        }

        let estimate = {
            let mut window = window.lock();
            if !window.push(elapsed_ms) {
                trace!(algorithm = name, elapsed_ms, "discarded invalid sample");
                return Ok(());
            }
            if window.len() < self.min_samples {
                return Ok(());
            }
            match (window.mean(), window.max()) {
                (Some(avg), Some(worst)) => TimingEstimate::new(avg, worst),
                _ => return Ok(()),
            }
        };

        debug!(
            algorithm = name,
            avg_ms = estimate.avg_time_ms,
            worst_ms = estimate.worst_time_ms,
            "calibrated timing"
        );
        self.catalog.update_timing(name, estimate)
    }

    /// Observed `(avg, worst)` for `name`, or `None` with no samples.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name.
    pub fn estimate(&self, name: &str) -> Result<Option<TimingEstimate>> {
        let window = self.window(name)?.lock();
        Ok(match (window.mean(), window.max()) {
            (Some(avg), Some(worst)) => Some(TimingEstimate::new(avg, worst)),
            _ => None,
        })
    }

    /// Summary statistics of the window for `name`.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name.
    pub fn statistics(&self, name: &str) -> Result<WindowStatistics> {
        Ok(self.window(name)?.lock().statistics())
    }

    /// Number of samples held for `name`.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name.
    pub fn sample_count(&self, name: &str) -> Result<usize> {
        Ok(self.window(name)?.lock().len())
    }

    /// Drops the history of `name`. The catalog keeps its last estimate.
    ///
    /// # Errors
    /// `AlgorithmNotFound` for an unknown name.
    pub fn reset(&self, name: &str) -> Result<()> {
        self.window(name)?.lock().clear();
        Ok(())
    }

    fn window(&self, name: &str) -> Result<&Mutex<SampleWindow>> {
        self.windows.get(name).ok_or_else(|| CoreError::AlgorithmNotFound(name.to_string()))
    }
}
