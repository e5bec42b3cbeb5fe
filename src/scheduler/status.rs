use serde::{Deserialize, Serialize};

use crate::monitor::MonitorId;

/// Snapshot of the scheduler for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    pub active_schedules: usize,
    pub monitors: Vec<ScheduledMonitor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMonitor {
    pub id: MonitorId,
    pub interval_seconds: u64,
}

impl SchedulerStatus {
    pub fn from_snapshot(running: bool, snapshot: Vec<(MonitorId, u64)>) -> Self {
        let monitors: Vec<ScheduledMonitor> = snapshot
            .into_iter()
            .map(|(id, interval_seconds)| ScheduledMonitor {
                id,
                interval_seconds,
            })
            .collect();
        Self {
            running,
            active_schedules: monitors.len(),
            monitors,
        }
    }
}
