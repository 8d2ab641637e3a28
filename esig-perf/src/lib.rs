#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::panic)]

//! Elastisig Performance Primitives
//!
//! Timing support for the time-budgeted signing engine. The engine needs two
//! things from this crate:
//!
//! - **Wall-clock measurement** of individual signing tasks and of the whole
//!   parallel fan-out, in fractional milliseconds ([`Stopwatch`], [`measure`]).
//! - **Bounded sample windows** holding the most recent execution times of one
//!   algorithm, from which the calibrator derives average and worst-case cost
//!   ([`SampleWindow`], [`WindowStatistics`]).
//!
//! # Example
//!
//! ```rust
//! use esig_perf::{SampleWindow, Stopwatch};
//!
//! let mut window = SampleWindow::new(100);
//! let watch = Stopwatch::start();
//! // ... sign something ...
//! window.push(watch.elapsed_ms());
//!
//! let stats = window.statistics();
//! assert_eq!(stats.count, 1);
//! assert!(stats.mean_ms <= stats.max_ms);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of samples retained per algorithm.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Converts a [`Duration`] into fractional milliseconds.
#[inline]
#[must_use]
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Converts fractional milliseconds into a [`Duration`].
///
/// Negative and NaN inputs saturate to zero; values beyond the range of
/// [`Duration`] (including positive infinity) saturate to [`Duration::MAX`].
#[inline]
#[must_use]
pub fn ms_to_duration(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

/// A started wall-clock timer reporting milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    #[inline]
    #[must_use]
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    /// Instant at which the stopwatch was started.
    #[inline]
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started
    }

    /// Elapsed time since start.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time since start in fractional milliseconds.
    #[inline]
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        duration_to_ms(self.elapsed())
    }
}

/// Runs `operation` and returns its output together with the elapsed milliseconds.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(operation: F) -> (T, f64) {
    let watch = Stopwatch::start();
    let output = operation();
    (output, watch.elapsed_ms())
}

/// Summary of the samples currently held by a [`SampleWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowStatistics {
    /// Number of samples
    pub count: usize,
    /// Smallest sample
    pub min_ms: f64,
    /// Arithmetic mean
    pub mean_ms: f64,
    /// Largest sample
    pub max_ms: f64,
    /// 95th percentile (nearest-rank on the sorted window)
    pub p95_ms: f64,
}

/// Ring buffer of the most recent timing samples, in milliseconds.
///
/// Once full, every new sample evicts the oldest one. Non-finite and negative
/// samples are rejected so a misbehaving clock cannot poison the estimates.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SampleWindow {
    /// Creates an empty window retaining at most `capacity` samples (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    /// Maximum number of retained samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends a sample, evicting the oldest one when full.
    ///
    /// Returns `false` (and records nothing) for negative or non-finite values.
    pub fn push(&mut self, sample_ms: f64) -> bool {
        if !sample_ms.is_finite() || sample_ms < 0.0 {
            return false;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample_ms);
        true
    }

    /// Drops every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Iterates samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Arithmetic mean of the window, `None` when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Largest sample in the window, `None` when empty.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    /// Computes summary statistics; all zero for an empty window.
    #[must_use]
    pub fn statistics(&self) -> WindowStatistics {
        let (Some(mean_ms), Some(max_ms)) = (self.mean(), self.max()) else {
            return WindowStatistics::default();
        };

        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        WindowStatistics {
            count: sorted.len(),
            min_ms: sorted.first().copied().unwrap_or(0.0),
            mean_ms,
            max_ms,
            p95_ms: percentile(&sorted, 95.0),
        }
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let last = sorted.len().saturating_sub(1);
    let index = ((percentile / 100.0) * last as f64).round() as usize;
    sorted.get(index.min(last)).copied().unwrap_or(0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest_sample() {
        let mut window = SampleWindow::new(3);
        for sample in [1.0, 2.0, 3.0, 4.0] {
            assert!(window.push(sample));
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.mean(), Some(3.0));
        assert_eq!(window.max(), Some(4.0));
    }

    #[test]
    fn test_window_rejects_invalid_samples() {
        let mut window = SampleWindow::new(4);
        assert!(!window.push(-1.0));
        assert!(!window.push(f64::NAN));
        assert!(!window.push(f64::INFINITY));
        assert!(window.is_empty());
        assert_eq!(window.mean(), None);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut window = SampleWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(5.0);
        window.push(7.0);
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![7.0]);
    }

    #[test]
    fn test_statistics_of_empty_window() {
        let window = SampleWindow::default();
        assert_eq!(window.statistics(), WindowStatistics::default());
        assert_eq!(window.capacity(), DEFAULT_WINDOW_CAPACITY);
    }

    #[test]
    fn test_statistics_ordering() {
        let mut window = SampleWindow::new(100);
        for i in 0..100 {
            window.push(f64::from(i));
        }
        let stats = window.statistics();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min_ms, 0.0);
        assert_eq!(stats.max_ms, 99.0);
        assert!((stats.mean_ms - 49.5).abs() < 1e-9);
        assert!(stats.p95_ms >= 93.0 && stats.p95_ms <= 95.0);
    }

    #[test]
    fn test_ms_duration_conversions() {
        assert_eq!(ms_to_duration(-4.0), Duration::ZERO);
        assert_eq!(ms_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(ms_to_duration(1500.0), Duration::from_millis(1500));
        assert!((duration_to_ms(Duration::from_micros(2500)) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_huge_ms_saturates_to_max() {
        assert_eq!(ms_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(ms_to_duration(f64::MAX), Duration::MAX);
        assert_eq!(ms_to_duration(1e300), Duration::MAX);
        assert_eq!(ms_to_duration(f64::NEG_INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_measure_reports_elapsed() {
        let (value, elapsed) = measure(|| {
            std::thread::sleep(Duration::from_millis(5));
            42
        });
        assert_eq!(value, 42);
        assert!(elapsed >= 5.0);
    }
}
