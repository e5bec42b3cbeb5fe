//! Failure notification subsystem.
//!
//! # Data Flow
//! ```text
//! failed outcome + owner destination
//!     → FailureNotifier (log.rs / webhook.rs)
//!     → error logged by the pipeline, never propagated
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::probe::ProbeOutcome;

pub mod log;
pub mod webhook;

pub use self::log::LogNotifier;
pub use self::webhook::WebhookNotifier;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Best-effort delivery of failure alerts.
#[async_trait]
pub trait FailureNotifier: Send + Sync {
    async fn notify_failure(
        &self,
        destination: &str,
        monitor_name: &str,
        url: &str,
        outcome: &ProbeOutcome,
    ) -> Result<(), NotifyError>;
}

/// Alert body shared by every notifier.
#[derive(Debug, Clone, Serialize)]
pub struct FailureAlert {
    pub to: String,
    pub subject: String,
    pub monitor_id: String,
    pub monitor_name: String,
    pub url: String,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<u64>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl FailureAlert {
    pub fn new(destination: &str, monitor_name: &str, url: &str, outcome: &ProbeOutcome) -> Self {
        Self {
            to: destination.to_string(),
            subject: format!("Monitor Alert: {} is DOWN", monitor_name),
            monitor_id: outcome.monitor_id.to_string(),
            monitor_name: monitor_name.to_string(),
            url: url.to_string(),
            status_code: outcome.status_code,
            response_time_ms: outcome.response_time_ms,
            message: outcome.message.clone(),
            timestamp: outcome.timestamp,
        }
    }
}
