//! Reconciliation of the schedule registry against the repository.
//!
//! # Responsibilities
//! - Fetch the active monitor set
//! - Drop schedules for monitors no longer active
//! - Restart schedules whose interval changed
//! - Start schedules for newly active monitors
//!
//! Passes are level-triggered: each one compares full state, so a missed
//! or failed pass is repaired by the next.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::registry::{FireFn, RegistryError, ScheduleRegistry};
use crate::lifecycle::ShutdownSignal;
use crate::monitor::{interval_in_bounds, MonitorId, MonitorRepository, RepositoryError};
use crate::observability::metrics;

/// Builds the fire callback for a newly scheduled monitor.
pub type FireFactory = Arc<dyn Fn(&MonitorId) -> FireFn + Send + Sync>;

/// What a single pass changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub added: usize,
    pub removed: usize,
    pub rescheduled: usize,
    /// Active monitors left unscheduled because their interval is out of range.
    pub skipped: usize,
}

impl PassReport {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.rescheduled == 0
    }
}

pub struct Reconciler {
    repository: Arc<dyn MonitorRepository>,
    registry: Arc<ScheduleRegistry>,
    fire_factory: FireFactory,
    pass_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        repository: Arc<dyn MonitorRepository>,
        registry: Arc<ScheduleRegistry>,
        fire_factory: FireFactory,
    ) -> Self {
        Self {
            repository,
            registry,
            fire_factory,
            pass_lock: Mutex::new(()),
        }
    }

    /// Run one pass. On fetch failure the registry is left untouched.
    pub async fn reconcile_once(&self) -> Result<PassReport, RepositoryError> {
        let _pass = self.pass_lock.lock().await;

        let fetched = match self.repository.list_active_monitors().await {
            Ok(monitors) => monitors,
            Err(e) => {
                metrics::record_reconcile_pass(false);
                tracing::error!(error = %e, "Failed to load active monitors, keeping current schedules");
                return Err(e);
            }
        };

        let mut report = PassReport::default();
        let mut desired: HashMap<MonitorId, u64> = HashMap::with_capacity(fetched.len());
        for monitor in fetched {
            if !interval_in_bounds(monitor.interval_secs) {
                tracing::warn!(
                    monitor_id = %monitor.id,
                    interval_secs = monitor.interval_secs,
                    "Interval out of range, not scheduling"
                );
                report.skipped += 1;
                continue;
            }
            desired.insert(monitor.id, monitor.interval_secs);
        }

        for id in self.registry.ids() {
            if !desired.contains_key(&id) && self.registry.remove(&id) {
                tracing::info!(monitor_id = %id, "Stopped monitoring");
                report.removed += 1;
            }
        }

        for (id, interval_secs) in desired {
            match self.registry.current_interval(&id) {
                Some(current) if current == interval_secs => {}
                Some(current) => {
                    self.registry.remove(&id);
                    if self.schedule(&id, interval_secs) {
                        tracing::info!(
                            monitor_id = %id,
                            from_secs = current,
                            to_secs = interval_secs,
                            "Interval changed, rescheduled"
                        );
                        report.rescheduled += 1;
                    }
                }
                None => {
                    if self.schedule(&id, interval_secs) {
                        tracing::info!(monitor_id = %id, interval_secs, "Started monitoring");
                        report.added += 1;
                    }
                }
            }
        }

        metrics::record_reconcile_pass(true);
        if !report.is_noop() {
            tracing::info!(
                added = report.added,
                removed = report.removed,
                rescheduled = report.rescheduled,
                active = self.registry.len(),
                "Reconciliation pass applied changes"
            );
        }
        Ok(report)
    }

    fn schedule(&self, id: &MonitorId, interval_secs: u64) -> bool {
        let fire = (self.fire_factory)(id);
        match self.registry.add(id.clone(), interval_secs, fire) {
            Ok(()) => true,
            Err(RegistryError::AlreadyScheduled(_)) => {
                tracing::debug!(monitor_id = %id, "Already scheduled");
                false
            }
            Err(e) => {
                tracing::warn!(monitor_id = %id, error = %e, "Failed to schedule monitor");
                false
            }
        }
    }

    /// Repeat passes every `period` until shutdown. The first pass here
    /// happens one period from now; callers run the startup pass themselves.
    pub async fn run(self: Arc<Self>, period: Duration, mut shutdown: ShutdownSignal) {
        tracing::info!(interval_secs = period.as_secs(), "Reconciliation loop starting");

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.reconcile_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reconciliation loop received shutdown signal, exiting");
                    break;
                }
            }
        }
    }
}
