//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the scheduler.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the uptime scheduler.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Scheduler timing and overlap settings.
    pub scheduler: SchedulerConfig,

    /// Where the monitor catalog lives.
    pub monitors: MonitorsConfig,

    /// Run recorder settings.
    pub runs: RunsConfig,

    /// Failure notification settings.
    pub notifications: NotificationConfig,

    /// Introspection API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// What to do when a timer fires while the previous firing for the same
/// monitor is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Start the new firing anyway; probes for one monitor may run concurrently.
    #[default]
    Allow,
    /// Drop the tick; no outcome is produced for it.
    Skip,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Period of the reconciliation loop in seconds.
    pub reconcile_interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Overlapping firing policy.
    pub overlap: OverlapPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: 60,
            probe_timeout_secs: 30,
            overlap: OverlapPolicy::Allow,
        }
    }
}

/// Monitor catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorsConfig {
    /// Path to the TOML catalog re-read on every reconciliation pass.
    pub catalog_path: String,
}

impl Default for MonitorsConfig {
    fn default() -> Self {
        Self {
            catalog_path: "monitors.toml".to_string(),
        }
    }
}

/// Run recorder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunsConfig {
    /// Optional JSON snapshot file loaded at boot and written at shutdown.
    pub persistence_path: Option<String>,

    /// Oldest outcomes are evicted beyond this many per monitor.
    pub max_runs_per_monitor: usize,
}

impl Default for RunsConfig {
    fn default() -> Self {
        Self {
            persistence_path: None,
            max_runs_per_monitor: 1000,
        }
    }
}

/// Which notifier delivers failure alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    /// Write the alert to the log only.
    #[default]
    Log,
    /// POST a JSON payload to `webhook_url`.
    Webhook,
}

/// Failure notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub kind: NotifierKind,

    /// Delivery endpoint when `kind = "webhook"`.
    pub webhook_url: Option<String>,

    /// Delivery timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Log,
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler.reconcile_interval_secs, 60);
        assert_eq!(config.scheduler.probe_timeout_secs, 30);
        assert_eq!(config.scheduler.overlap, OverlapPolicy::Allow);
        assert_eq!(config.notifications.kind, NotifierKind::Log);
        assert!(config.runs.persistence_path.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [scheduler]
            overlap = "skip"

            [notifications]
            kind = "webhook"
            webhook_url = "https://hooks.example.com/alerts"
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.overlap, OverlapPolicy::Skip);
        assert_eq!(config.scheduler.reconcile_interval_secs, 60);
        assert_eq!(config.notifications.kind, NotifierKind::Webhook);
        assert_eq!(config.notifications.timeout_secs, 10);
    }
}
