//! Schedule registry.
//!
//! # Responsibilities
//! - Own one repeating timer task per monitor ID
//! - Fire immediately on add, then every interval
//! - Cancel future firings on remove
//!
//! Each tick spawns the fire callback as its own task, so aborting the
//! timer never interrupts a firing already in flight, and a slow firing
//! never delays the next tick.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::monitor::MonitorId;
use crate::observability::metrics;

/// Callback run on every tick of a schedule.
pub type FireFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Monitor {0} is already scheduled")]
    AlreadyScheduled(MonitorId),
    #[error("Interval must be greater than zero")]
    ZeroInterval,
}

struct ScheduleEntry {
    interval_secs: u64,
    timer: JoinHandle<()>,
}

/// In-memory map from monitor ID to its live timer.
#[derive(Default)]
pub struct ScheduleRegistry {
    entries: DashMap<MonitorId, ScheduleEntry>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer for `monitor_id`. Must be called inside a
    /// Tokio runtime. Refuses to start a second timer for the same ID.
    pub fn add(
        &self,
        monitor_id: MonitorId,
        interval_secs: u64,
        fire: FireFn,
    ) -> Result<(), RegistryError> {
        if interval_secs == 0 {
            return Err(RegistryError::ZeroInterval);
        }

        match self.entries.entry(monitor_id) {
            Entry::Occupied(occupied) => {
                Err(RegistryError::AlreadyScheduled(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                let timer = spawn_timer(Duration::from_secs(interval_secs), fire);
                vacant.insert(ScheduleEntry {
                    interval_secs,
                    timer,
                });
                metrics::set_active_schedules(self.entries.len());
                Ok(())
            }
        }
    }

    /// Cancel and forget a schedule. Returns false if there was none.
    pub fn remove(&self, monitor_id: &MonitorId) -> bool {
        let removed = match self.entries.remove(monitor_id) {
            Some((_, entry)) => {
                entry.timer.abort();
                true
            }
            None => false,
        };
        if removed {
            metrics::set_active_schedules(self.entries.len());
        }
        removed
    }

    pub fn has(&self, monitor_id: &MonitorId) -> bool {
        self.entries.contains_key(monitor_id)
    }

    /// Interval the monitor was scheduled with, if scheduled.
    pub fn current_interval(&self, monitor_id: &MonitorId) -> Option<u64> {
        self.entries.get(monitor_id).map(|e| e.interval_secs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<MonitorId> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// (monitor ID, interval) pairs sorted by ID.
    pub fn snapshot(&self) -> Vec<(MonitorId, u64)> {
        let mut entries: Vec<(MonitorId, u64)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().interval_secs))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Cancel every schedule. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        for id in self.ids() {
            if self.remove(&id) {
                removed += 1;
            }
        }
        removed
    }
}

impl Drop for ScheduleRegistry {
    fn drop(&mut self) {
        for entry in self.entries.iter() {
            entry.value().timer.abort();
        }
    }
}

fn spawn_timer(period: Duration, fire: FireFn) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        // Hold phase after a stall; no catch-up burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tokio::spawn(fire());
        }
    })
}
