//! Scheduler facade.
//!
//! # Responsibilities
//! - Start and stop the reconciliation loop
//! - Wrap each firing with panic isolation and the overlap policy
//! - Answer status queries and on-demand checks

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::pipeline::HealthCheckPipeline;
use super::reconcile::{FireFactory, PassReport, Reconciler};
use super::registry::{FireFn, ScheduleRegistry};
use super::status::SchedulerStatus;
use crate::config::{OverlapPolicy, SchedulerConfig};
use crate::lifecycle::Shutdown;
use crate::monitor::{MonitorId, MonitorRepository, RepositoryError};
use crate::observability::metrics;
use crate::probe::ProbeOutcome;

struct RunningLoop {
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    registry: Arc<ScheduleRegistry>,
    reconciler: Arc<Reconciler>,
    pipeline: Arc<HealthCheckPipeline>,
    reconcile_interval: Duration,
    running: AtomicBool,
    state: Mutex<Option<RunningLoop>>,
}

impl Scheduler {
    pub fn new(
        repository: Arc<dyn MonitorRepository>,
        pipeline: HealthCheckPipeline,
        config: &SchedulerConfig,
    ) -> Self {
        let pipeline = Arc::new(pipeline);
        let registry = Arc::new(ScheduleRegistry::new());
        let fire_factory = fire_factory(pipeline.clone(), config.overlap);
        let reconciler = Arc::new(Reconciler::new(repository, registry.clone(), fire_factory));

        Self {
            registry,
            reconciler,
            pipeline,
            reconcile_interval: Duration::from_secs(config.reconcile_interval_secs),
            running: AtomicBool::new(false),
            state: Mutex::new(None),
        }
    }

    /// Run the startup pass, then keep reconciling in the background.
    /// Calling this while already running does nothing.
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        if state.is_some() {
            tracing::warn!("Scheduler already running");
            return;
        }

        tracing::info!(
            reconcile_interval_secs = self.reconcile_interval.as_secs(),
            "Starting scheduler"
        );
        let _ = self.reconciler.reconcile_once().await;

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(
            self.reconciler
                .clone()
                .run(self.reconcile_interval, shutdown.subscribe()),
        );
        *state = Some(RunningLoop { shutdown, handle });
        self.running.store(true, Ordering::SeqCst);

        tracing::info!(active_schedules = self.registry.len(), "Scheduler started");
    }

    /// Stop the loop and cancel every schedule. Firings already in flight
    /// finish on their own.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let Some(running) = state.take() else {
            return;
        };

        running.shutdown.trigger();
        if let Err(e) = running.handle.await {
            tracing::error!(error = %e, "Reconciliation loop ended abnormally");
        }
        let cancelled = self.registry.clear();
        self.running.store(false, Ordering::SeqCst);

        tracing::info!(cancelled, "Scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus::from_snapshot(self.is_running(), self.registry.snapshot())
    }

    /// Run one firing now, outside the schedule. The outcome is recorded
    /// like any other.
    pub async fn run_check_now(&self, monitor_id: &MonitorId) -> ProbeOutcome {
        tracing::info!(monitor_id = %monitor_id, "Manual check requested");
        self.pipeline.run(monitor_id).await
    }

    /// Run one reconciliation pass now. A stopped scheduler owns no
    /// schedules, so this is a no-op returning an empty report until
    /// `start` is called.
    pub async fn reconcile_now(&self) -> Result<PassReport, RepositoryError> {
        // Held across the pass; `stop` clears the registry under this lock.
        let state = self.state.lock().await;
        if state.is_none() {
            tracing::debug!("Scheduler stopped, skipping reconciliation");
            return Ok(PassReport::default());
        }
        self.reconciler.reconcile_once().await
    }

    pub fn registry(&self) -> &ScheduleRegistry {
        &self.registry
    }
}

/// Clears the in-flight flag even if the firing panics.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn fire_factory(pipeline: Arc<HealthCheckPipeline>, overlap: OverlapPolicy) -> FireFactory {
    Arc::new(move |monitor_id: &MonitorId| {
        let pipeline = pipeline.clone();
        let monitor_id = monitor_id.clone();
        let busy = Arc::new(AtomicBool::new(false));

        let fire: FireFn = Arc::new(move || {
            let pipeline = pipeline.clone();
            let monitor_id = monitor_id.clone();
            let busy = busy.clone();

            async move {
                let _guard = match overlap {
                    OverlapPolicy::Allow => None,
                    OverlapPolicy::Skip => {
                        if busy.swap(true, Ordering::SeqCst) {
                            metrics::record_skipped_firing();
                            tracing::debug!(monitor_id = %monitor_id, "Previous check still running, skipping");
                            return;
                        }
                        Some(InFlight(&busy))
                    }
                };

                let result = AssertUnwindSafe(pipeline.run(&monitor_id))
                    .catch_unwind()
                    .await;
                if result.is_err() {
                    tracing::error!(monitor_id = %monitor_id, "Firing panicked after check");
                }
            }
            .boxed()
        });
        fire
    })
}
