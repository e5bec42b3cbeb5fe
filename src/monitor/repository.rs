//! Monitor repository: where the scheduler reads its desired state from.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use crate::monitor::types::{ActiveMonitor, MonitorConfig, MonitorId};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Monitor {0} not found")]
    NotFound(MonitorId),
    #[error("Monitor source unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid monitor catalog: {0}")]
    Invalid(String),
}

/// Read side of monitor persistence, as consumed by the scheduler.
#[async_trait]
pub trait MonitorRepository: Send + Sync {
    /// All monitors currently flagged active.
    async fn list_active_monitors(&self) -> Result<Vec<ActiveMonitor>, RepositoryError>;

    /// Full configuration of one monitor, active or not.
    async fn get_monitor_config(&self, id: &MonitorId) -> Result<MonitorConfig, RepositoryError>;
}

/// Thread-safe in-process monitor store.
#[derive(Clone, Default)]
pub struct InMemoryMonitorRepository {
    inner: Arc<DashMap<MonitorId, MonitorConfig>>,
}

impl InMemoryMonitorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitors(monitors: impl IntoIterator<Item = MonitorConfig>) -> Self {
        let repo = Self::new();
        for monitor in monitors {
            repo.upsert(monitor);
        }
        repo
    }

    /// Insert or replace a monitor.
    pub fn upsert(&self, monitor: MonitorConfig) {
        self.inner.insert(monitor.id.clone(), monitor);
    }

    pub fn remove(&self, id: &MonitorId) -> Option<MonitorConfig> {
        self.inner.remove(id).map(|(_, m)| m)
    }

    /// Flip the active flag. Returns false if the monitor does not exist.
    pub fn set_active(&self, id: &MonitorId, active: bool) -> bool {
        match self.inner.get_mut(id) {
            Some(mut entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Change the probing interval. Returns false if the monitor does not exist.
    pub fn set_interval(&self, id: &MonitorId, interval_secs: u64) -> bool {
        match self.inner.get_mut(id) {
            Some(mut entry) => {
                entry.interval_secs = interval_secs;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl MonitorRepository for InMemoryMonitorRepository {
    async fn list_active_monitors(&self) -> Result<Vec<ActiveMonitor>, RepositoryError> {
        let mut active: Vec<ActiveMonitor> = self
            .inner
            .iter()
            .filter(|r| r.value().active)
            .map(|r| r.value().summary())
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(active)
    }

    async fn get_monitor_config(&self, id: &MonitorId) -> Result<MonitorConfig, RepositoryError> {
        self.inner
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    monitors: Vec<MonitorConfig>,
}

/// Monitor catalog backed by a TOML file, re-read on every call.
///
/// Entries that fail validation are skipped with a warning, so one bad
/// edit removes that monitor from the active set instead of stalling the
/// whole catalog. Duplicate IDs reject the file.
#[derive(Debug, Clone)]
pub struct FileMonitorRepository {
    path: PathBuf,
}

impl FileMonitorRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<MonitorConfig>, RepositoryError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RepositoryError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        parse_catalog(&content)
    }
}

fn parse_catalog(content: &str) -> Result<Vec<MonitorConfig>, RepositoryError> {
    let catalog: Catalog =
        toml::from_str(content).map_err(|e| RepositoryError::Invalid(e.to_string()))?;

    let mut seen = HashSet::new();
    for monitor in &catalog.monitors {
        if !seen.insert(monitor.id.clone()) {
            return Err(RepositoryError::Invalid(format!(
                "duplicate monitor id '{}'",
                monitor.id
            )));
        }
    }

    Ok(catalog
        .monitors
        .into_iter()
        .filter(|monitor| match monitor.validate() {
            Ok(()) => true,
            Err(problems) => {
                tracing::warn!(
                    monitor_id = %monitor.id,
                    problems = %problems.join("; "),
                    "Skipping invalid monitor catalog entry"
                );
                false
            }
        })
        .collect())
}

#[async_trait]
impl MonitorRepository for FileMonitorRepository {
    async fn list_active_monitors(&self) -> Result<Vec<ActiveMonitor>, RepositoryError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|m| m.active)
            .map(|m| m.summary())
            .collect())
    }

    async fn get_monitor_config(&self, id: &MonitorId) -> Result<MonitorConfig, RepositoryError> {
        self.load()
            .await?
            .into_iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}
