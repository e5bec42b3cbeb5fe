//! Health-check pipeline.
//!
//! # Responsibilities
//! - Look up the current monitor definition at fire time
//! - Probe it, or short-circuit if it is no longer active
//! - Record exactly one outcome per firing
//! - Alert the owner on failure, best effort
//!
//! Nothing in here returns an error to the caller: every failure mode
//! becomes either a recorded failure outcome or a log line.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::monitor::{MonitorConfig, MonitorId, MonitorRepository};
use crate::notify::FailureNotifier;
use crate::observability::metrics;
use crate::probe::{ProbeExecutor, ProbeOutcome};
use crate::runs::RunRecorder;

/// Message recorded when lookup or probing panics.
pub const PANICKED_MESSAGE: &str = "Health check panicked";

pub struct HealthCheckPipeline {
    repository: Arc<dyn MonitorRepository>,
    recorder: Arc<dyn RunRecorder>,
    notifier: Arc<dyn FailureNotifier>,
    executor: ProbeExecutor,
}

impl HealthCheckPipeline {
    pub fn new(
        repository: Arc<dyn MonitorRepository>,
        recorder: Arc<dyn RunRecorder>,
        notifier: Arc<dyn FailureNotifier>,
        executor: ProbeExecutor,
    ) -> Self {
        Self {
            repository,
            recorder,
            notifier,
            executor,
        }
    }

    /// Run one firing for `monitor_id` and return the outcome that was recorded.
    pub async fn run(&self, monitor_id: &MonitorId) -> ProbeOutcome {
        let (outcome, monitor) = match AssertUnwindSafe(self.check(monitor_id))
            .catch_unwind()
            .await
        {
            Ok(checked) => checked,
            Err(_) => {
                tracing::error!(monitor_id = %monitor_id, "Health check panicked");
                (ProbeOutcome::failure(monitor_id.clone(), PANICKED_MESSAGE), None)
            }
        };

        self.record(&outcome).await;

        if let Some(monitor) = monitor {
            if !outcome.success {
                self.notify(&monitor, &outcome).await;
            }
        }

        outcome
    }

    /// Produce the outcome, plus the definition when an alert may follow.
    async fn check(&self, monitor_id: &MonitorId) -> (ProbeOutcome, Option<MonitorConfig>) {
        let monitor = match self.repository.get_monitor_config(monitor_id).await {
            Ok(monitor) => monitor,
            Err(e) => {
                tracing::warn!(monitor_id = %monitor_id, error = %e, "Monitor lookup failed");
                return (ProbeOutcome::failure(monitor_id.clone(), e.to_string()), None);
            }
        };

        if !monitor.active {
            tracing::debug!(monitor_id = %monitor_id, "Monitor inactive, skipping probe");
            return (ProbeOutcome::inactive(monitor_id.clone()), None);
        }

        let outcome = self.executor.execute(&monitor).await;
        metrics::record_probe(outcome.success, outcome.response_time_ms);

        if outcome.success {
            tracing::debug!(
                monitor_id = %monitor_id,
                status = ?outcome.status_code,
                response_time_ms = ?outcome.response_time_ms,
                "Health check passed"
            );
        } else {
            tracing::warn!(
                monitor_id = %monitor_id,
                url = %monitor.url,
                status = ?outcome.status_code,
                message = %outcome.message,
                "Health check failed"
            );
        }

        (outcome, Some(monitor))
    }

    async fn record(&self, outcome: &ProbeOutcome) {
        if let Err(e) = self.recorder.record_outcome(outcome).await {
            metrics::record_write_failure();
            tracing::error!(
                monitor_id = %outcome.monitor_id,
                error = %e,
                "Failed to record check outcome"
            );
        }
    }

    async fn notify(&self, monitor: &MonitorConfig, outcome: &ProbeOutcome) {
        let Some(destination) = monitor.notify_address.as_deref() else {
            return;
        };

        match self
            .notifier
            .notify_failure(destination, &monitor.name, &monitor.url, outcome)
            .await
        {
            Ok(()) => metrics::record_notification(true),
            Err(e) => {
                metrics::record_notification(false);
                tracing::warn!(
                    monitor_id = %monitor.id,
                    to = %destination,
                    error = %e,
                    "Failure notification not delivered"
                );
            }
        }
    }
}
