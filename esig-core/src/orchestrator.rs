//! Parallel signing orchestration.
//!
//! Every selected algorithm signs the message on its own named OS thread.
//! The orchestrator joins all of them (not the first to finish) against
//! per-task deadlines of `worst_time_ms * timeout_margin + timeout_floor_ms`,
//! measured from the moment the task starts signing. A task past its
//! deadline is recorded as timed out and abandoned: its thread is detached
//! and anything it reports later is discarded.
//!
//! Individual failures (key unavailable, primitive error, panic, timeout)
//! become failed outcomes and never affect sibling tasks. Only a shortfall
//! against the required minimum fails the whole operation.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use esig_perf::{Stopwatch, duration_to_ms, measure, ms_to_duration};
use tracing::{debug, info, instrument, trace, warn};

use crate::calibrator::PerformanceCalibrator;
use crate::config::EngineConfig;
use crate::error::{CoreError, Result};
use crate::traits::KeyStore;
use crate::types::{AlgorithmProfile, SigningOutcome};

#[derive(Debug)]
enum TaskEvent {
    Started { index: usize, at: Instant },
    Finished { index: usize, result: std::result::Result<Vec<u8>, String>, sign_ms: f64 },
}

/// Outcomes of one parallel run, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationReport {
    /// One outcome per selected algorithm
    pub outcomes: Vec<SigningOutcome>,
    /// Wall-clock time of the whole fan-out
    pub elapsed_ms: f64,
}

impl OrchestrationReport {
    /// Successful outcomes in selection order.
    pub fn successes(&self) -> impl Iterator<Item = &SigningOutcome> {
        self.outcomes.iter().filter(|o| o.success)
    }

    /// Failed outcomes in selection order.
    pub fn failures(&self) -> impl Iterator<Item = &SigningOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Number of successful outcomes.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes().count()
    }
}

/// Runs the selected algorithms concurrently against one message.
pub struct SigningOrchestrator {
    key_store: Arc<dyn KeyStore>,
    calibrator: Arc<PerformanceCalibrator>,
    config: EngineConfig,
}

impl std::fmt::Debug for SigningOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningOrchestrator")
            .field("timeout_margin", &self.config.timeout_margin)
            .field("timeout_floor_ms", &self.config.timeout_floor_ms)
            .finish_non_exhaustive()
    }
}

impl SigningOrchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        key_store: Arc<dyn KeyStore>,
        calibrator: Arc<PerformanceCalibrator>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            key_store,
            calibrator,
            config: config.clone(),
        }
    }

    /// Deadline for one task, measured from the start of signing.
    #[must_use]
    pub fn task_timeout(&self, profile: &AlgorithmProfile) -> Duration {
        ms_to_duration(self.config.task_timeout_ms(profile.worst_time_ms))
    }

    /// Signs `message` with every profile in `selected` concurrently.
    ///
    /// # Errors
    /// `InsufficientSignatures` if fewer than `minimum` tasks succeed.
    #[instrument(level = "debug", skip(self, message, selected), fields(message_len = message.len(), tasks = selected.len(), minimum))]
    pub fn sign(
        &self,
        message: &[u8],
        selected: &[AlgorithmProfile],
        minimum: usize,
    ) -> Result<OrchestrationReport> {
        let watch = Stopwatch::start();
        let message: Arc<[u8]> = Arc::from(message);
        let (tx, rx) = mpsc::channel::<TaskEvent>();

        let timeouts: Vec<Duration> = selected.iter().map(|p| self.task_timeout(p)).collect();
        let mut outcomes: Vec<Option<SigningOutcome>> = vec![None; selected.len()];
        let mut started: Vec<Instant> = vec![watch.started_at(); selected.len()];
        // `None` when the timeout does not fit in an `Instant`: no deadline.
        let mut deadlines: Vec<Option<Instant>> = Vec::with_capacity(selected.len());
        let mut pending = 0usize;

        for (index, profile) in selected.iter().enumerate() {
            let spawned_at = Instant::now();
            let timeout = timeouts.get(index).copied().unwrap_or_default();
            deadlines.push(spawned_at.checked_add(timeout));
            if let Some(slot) = started.get_mut(index) {
                *slot = spawned_at;
            }
            match self.spawn_task(index, profile, &message, tx.clone()) {
                Ok(()) => pending += 1,
                Err(reason) => {
                    warn!(algorithm = %profile.name, %reason, "could not spawn signing task");
                    if let Some(slot) = outcomes.get_mut(index) {
                        *slot = Some(SigningOutcome::failed(&profile.name, reason, 0.0));
                    }
                }
            }
        }
        drop(tx);

        let mut abandoned: Vec<(usize, f64)> = Vec::new();
        while pending > 0 {
            let now = Instant::now();
            for (index, profile) in selected.iter().enumerate() {
                let expired = deadlines.get(index).copied().flatten().is_some_and(|d| d <= now);
                if let Some(slot @ None) = outcomes.get_mut(index) {
                    if expired {
                        let since = started.get(index).copied().unwrap_or(now);
                        let elapsed = duration_to_ms(now.saturating_duration_since(since));
                        warn!(algorithm = %profile.name, elapsed_ms = elapsed, "signing task timed out");
                        *slot = Some(SigningOutcome::abandoned(&profile.name, elapsed));
                        abandoned.push((index, elapsed));
                        pending -= 1;
                    }
                }
            }
            if pending == 0 {
                break;
            }

            let next_deadline = outcomes
                .iter()
                .zip(&deadlines)
                .filter(|(outcome, _)| outcome.is_none())
                .filter_map(|(_, deadline)| *deadline)
                .min();

            let event = match next_deadline {
                Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(now)),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match event {
                Ok(TaskEvent::Started { index, at }) => {
                    let still_pending = outcomes.get(index).is_some_and(Option::is_none);
                    if still_pending {
                        if let (Some(deadline), Some(since)) =
                            (deadlines.get_mut(index), started.get_mut(index))
                        {
                            *since = at;
                            let timeout = timeouts.get(index).copied().unwrap_or_default();
                            *deadline = at.checked_add(timeout);
                        }
                    }
                }
                Ok(TaskEvent::Finished { index, result, sign_ms }) => {
                    let Some(profile) = selected.get(index) else { continue };
                    let Some(slot @ None) = outcomes.get_mut(index) else {
                        trace!(algorithm = %profile.name, "discarding late result");
                        continue;
                    };
                    *slot = Some(match result {
                        Ok(signature) => {
                            debug!(algorithm = %profile.name, elapsed_ms = sign_ms, signature_len = signature.len(), "signed");
                            SigningOutcome::succeeded(&profile.name, signature, sign_ms)
                        }
                        Err(reason) => {
                            warn!(algorithm = %profile.name, %reason, "signing task failed");
                            SigningOutcome::failed(&profile.name, reason, sign_ms)
                        }
                    });
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    for (index, slot) in outcomes.iter_mut().enumerate() {
                        if slot.is_none() {
                            let name = selected.get(index).map_or("", |p| p.name.as_str());
                            *slot = Some(SigningOutcome::failed(
                                name,
                                "task ended without reporting",
                                0.0,
                            ));
                        }
                    }
                    pending = 0;
                }
            }
        }

        let outcomes: Vec<SigningOutcome> = outcomes
            .into_iter()
            .zip(selected)
            .map(|(outcome, profile)| {
                outcome.unwrap_or_else(|| SigningOutcome::failed(&profile.name, "no outcome", 0.0))
            })
            .collect();
        let report = OrchestrationReport { outcomes, elapsed_ms: watch.elapsed_ms() };

        self.calibrate(&report, &abandoned, selected);

        let succeeded = report.success_count();
        let failed = report.outcomes.len() - succeeded;
        info!(succeeded, failed, elapsed_ms = report.elapsed_ms, "parallel signing settled");
        if succeeded < minimum {
            return Err(CoreError::InsufficientSignatures { succeeded, required: minimum, failed });
        }
        Ok(report)
    }

    fn spawn_task(
        &self,
        index: usize,
        profile: &AlgorithmProfile,
        message: &Arc<[u8]>,
        tx: Sender<TaskEvent>,
    ) -> std::result::Result<(), String> {
        let profile = profile.clone();
        let message = Arc::clone(message);
        let key_store = Arc::clone(&self.key_store);

        thread::Builder::new()
            .name(format!("esig-{}", profile.name))
            .spawn(move || run_task(index, &profile, &message, key_store.as_ref(), &tx))
            .map(|_detached| ())
            .map_err(|e| format!("thread spawn failed: {e}"))
    }

    fn calibrate(
        &self,
        report: &OrchestrationReport,
        abandoned: &[(usize, f64)],
        selected: &[AlgorithmProfile],
    ) {
        let samples = report
            .successes()
            .map(|o| (o.algorithm.as_str(), o.elapsed_ms))
            .chain(abandoned.iter().filter_map(|&(index, elapsed)| {
                selected.get(index).map(|p| (p.name.as_str(), elapsed))
            }));
        for (name, elapsed_ms) in samples {
            if let Err(e) = self.calibrator.record(name, elapsed_ms) {
                warn!(algorithm = name, error = %e, "calibration skipped");
            }
        }
    }
}

fn run_task(
    index: usize,
    profile: &AlgorithmProfile,
    message: &[u8],
    key_store: &dyn KeyStore,
    tx: &Sender<TaskEvent>,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let key = key_store.get_or_create_key(profile).map_err(|e| (e.to_string(), 0.0))?;
        report(tx, TaskEvent::Started { index, at: Instant::now() });
        let (result, sign_ms) = measure(|| profile.capability.sign(message, &key));
        result.map(|sig| (sig, sign_ms)).map_err(|e| (e.to_string(), sign_ms))
    }));

    let event = match outcome {
        Ok(Ok((signature, sign_ms))) => TaskEvent::Finished { index, result: Ok(signature), sign_ms },
        Ok(Err((reason, sign_ms))) => TaskEvent::Finished { index, result: Err(reason), sign_ms },
        Err(payload) => TaskEvent::Finished {
            index,
            result: Err(format!("panicked: {}", panic_message(payload.as_ref()))),
            sign_ms: 0.0,
        },
    };
    report(tx, event);
}

fn report(tx: &Sender<TaskEvent>, event: TaskEvent) {
    if tx.send(event).is_err() {
        trace!("orchestrator no longer listening");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
