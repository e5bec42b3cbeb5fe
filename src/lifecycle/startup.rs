//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated `AppConfig` into live subsystems
//! - Wire repository, recorder and notifier into the scheduler
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The scheduler is built but not started; main decides when

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, NotifierKind};
use crate::monitor::{FileMonitorRepository, MonitorRepository};
use crate::notify::{FailureNotifier, LogNotifier, NotifyError, WebhookNotifier};
use crate::probe::ProbeExecutor;
use crate::runs::{MemoryRunRecorder, RecordError};
use crate::scheduler::{HealthCheckPipeline, Scheduler};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Monitor catalog not found at {0}")]
    CatalogMissing(String),
    #[error("Failed to load run history: {0}")]
    RunHistory(#[from] RecordError),
    #[error("Failed to build notifier: {0}")]
    Notifier(#[from] NotifyError),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Webhook notifier selected but notifications.webhook_url is unset")]
    MissingWebhookUrl,
}

/// Everything main needs to run and later shut down.
pub struct App {
    pub scheduler: Arc<Scheduler>,
    pub recorder: Arc<MemoryRunRecorder>,
}

pub fn build_app(config: &AppConfig) -> Result<App, StartupError> {
    let catalog = Path::new(&config.monitors.catalog_path);
    if !catalog.exists() {
        return Err(StartupError::CatalogMissing(
            config.monitors.catalog_path.clone(),
        ));
    }
    let repository: Arc<dyn MonitorRepository> = Arc::new(FileMonitorRepository::new(catalog));
    tracing::info!(path = %catalog.display(), "Using monitor catalog");

    let recorder = Arc::new(build_recorder(config)?);
    let notifier = build_notifier(config)?;
    let executor = ProbeExecutor::new(Duration::from_secs(config.scheduler.probe_timeout_secs))?;

    let pipeline = HealthCheckPipeline::new(
        repository.clone(),
        recorder.clone(),
        notifier,
        executor,
    );
    let scheduler = Arc::new(Scheduler::new(repository, pipeline, &config.scheduler));

    Ok(App {
        scheduler,
        recorder,
    })
}

fn build_recorder(config: &AppConfig) -> Result<MemoryRunRecorder, StartupError> {
    let max = config.runs.max_runs_per_monitor;
    match &config.runs.persistence_path {
        Some(path) => Ok(MemoryRunRecorder::load_from_file(Path::new(path), max)?),
        None => {
            tracing::info!("Run history persistence disabled");
            Ok(MemoryRunRecorder::new(max, None))
        }
    }
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn FailureNotifier>, StartupError> {
    let notifications = &config.notifications;
    match notifications.kind {
        NotifierKind::Log => Ok(Arc::new(LogNotifier)),
        NotifierKind::Webhook => {
            let url = notifications
                .webhook_url
                .as_deref()
                .ok_or(StartupError::MissingWebhookUrl)?;
            let notifier =
                WebhookNotifier::new(url, Duration::from_secs(notifications.timeout_secs))?;
            tracing::info!(endpoint = %url, "Failure alerts go to webhook");
            Ok(Arc::new(notifier))
        }
    }
}
