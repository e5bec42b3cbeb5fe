//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the selected notifier has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{AppConfig, NotifierKind};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.scheduler.reconcile_interval_secs == 0 {
        errors.push(ValidationError::new(
            "scheduler.reconcile_interval_secs",
            "must be greater than zero",
        ));
    }
    if config.scheduler.probe_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "scheduler.probe_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.monitors.catalog_path.trim().is_empty() {
        errors.push(ValidationError::new("monitors.catalog_path", "must not be empty"));
    }

    if config.runs.max_runs_per_monitor == 0 {
        errors.push(ValidationError::new(
            "runs.max_runs_per_monitor",
            "must be greater than zero",
        ));
    }

    if config.notifications.kind == NotifierKind::Webhook {
        match config.notifications.webhook_url.as_deref() {
            None => errors.push(ValidationError::new(
                "notifications.webhook_url",
                "required when kind = \"webhook\"",
            )),
            Some(raw) => {
                if let Err(e) = url::Url::parse(raw) {
                    errors.push(ValidationError::new(
                        "notifications.webhook_url",
                        format!("invalid URL '{}': {}", raw, e),
                    ));
                }
            }
        }
    }
    if config.notifications.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "notifications.timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "admin.bind_address",
            format!("invalid socket address '{}'", config.admin.bind_address),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "invalid socket address '{}'",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
