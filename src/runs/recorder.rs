//! Run recording and persistence.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::monitor::MonitorId;
use crate::probe::ProbeOutcome;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Run store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of probe outcomes.
#[async_trait]
pub trait RunRecorder: Send + Sync {
    /// Append one outcome.
    async fn record_outcome(&self, outcome: &ProbeOutcome) -> Result<(), RecordError>;

    /// Up to `limit` most recent outcomes for a monitor, newest first.
    async fn recent(&self, monitor_id: &MonitorId, limit: usize)
        -> Result<Vec<ProbeOutcome>, RecordError>;
}

/// A thread-safe in-memory run store with an optional JSON snapshot.
///
/// Each monitor keeps at most `max_per_monitor` outcomes; the oldest are
/// evicted first.
#[derive(Clone)]
pub struct MemoryRunRecorder {
    inner: Arc<DashMap<MonitorId, VecDeque<ProbeOutcome>>>,
    max_per_monitor: usize,
    persistence_path: Option<PathBuf>,
}

impl MemoryRunRecorder {
    /// Create a new empty recorder.
    pub fn new(max_per_monitor: usize, persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_per_monitor: max_per_monitor.max(1),
            persistence_path,
        }
    }

    /// Load from file if it exists; otherwise start empty with that path.
    pub fn load_from_file(path: &Path, max_per_monitor: usize) -> Result<Self, RecordError> {
        let recorder = Self::new(max_per_monitor, Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<MonitorId, Vec<ProbeOutcome>> = serde_json::from_reader(reader)?;

            for (monitor_id, mut runs) in map {
                runs.sort_by_key(|r| r.timestamp);
                let skip = runs.len().saturating_sub(recorder.max_per_monitor);
                recorder
                    .inner
                    .insert(monitor_id, runs.into_iter().skip(skip).collect());
            }
            tracing::info!(
                monitors = recorder.inner.len(),
                runs = recorder.total_count(),
                "Loaded run history from snapshot"
            );
        }
        Ok(recorder)
    }

    /// Write the snapshot file, if a path is configured.
    pub fn save_to_file(&self) -> Result<(), RecordError> {
        if let Some(path) = &self.persistence_path {
            let writer = BufWriter::new(File::create(path)?);
            let map: HashMap<MonitorId, Vec<ProbeOutcome>> = self
                .inner
                .iter()
                .map(|r| (r.key().clone(), r.value().iter().cloned().collect()))
                .collect();

            serde_json::to_writer(writer, &map)?;
            tracing::info!(path = %path.display(), runs = self.total_count(), "Saved run history snapshot");
        }
        Ok(())
    }

    /// Number of outcomes held across all monitors.
    pub fn total_count(&self) -> usize {
        self.inner.iter().map(|r| r.value().len()).sum()
    }

    /// Number of outcomes held for one monitor.
    pub fn count_for(&self, monitor_id: &MonitorId) -> usize {
        self.inner.get(monitor_id).map(|r| r.value().len()).unwrap_or(0)
    }

    /// Every held outcome for a monitor, oldest first.
    pub fn history(&self, monitor_id: &MonitorId) -> Vec<ProbeOutcome> {
        self.inner
            .get(monitor_id)
            .map(|r| r.value().iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryRunRecorder {
    fn default() -> Self {
        Self::new(1000, None)
    }
}

#[async_trait]
impl RunRecorder for MemoryRunRecorder {
    async fn record_outcome(&self, outcome: &ProbeOutcome) -> Result<(), RecordError> {
        let mut runs = self.inner.entry(outcome.monitor_id.clone()).or_default();
        runs.push_back(outcome.clone());
        while runs.len() > self.max_per_monitor {
            runs.pop_front();
        }
        Ok(())
    }

    async fn recent(
        &self,
        monitor_id: &MonitorId,
        limit: usize,
    ) -> Result<Vec<ProbeOutcome>, RecordError> {
        Ok(self
            .inner
            .get(monitor_id)
            .map(|r| r.value().iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
