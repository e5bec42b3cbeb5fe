//! Probe outcome record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::monitor::MonitorId;

/// Message attached to every successful outcome.
pub const SUCCESS_MESSAGE: &str = "Health check passed";
/// Message recorded when a firing finds its monitor deactivated.
pub const INACTIVE_MESSAGE: &str = "Monitor is not active";

/// The immutable record of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub id: Uuid,
    pub monitor_id: MonitorId,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// Absent when no response was received.
    pub status_code: Option<u16>,
    /// Absent when no response was received (never zero as a stand-in).
    pub response_time_ms: Option<u64>,
    pub message: String,
}

impl ProbeOutcome {
    fn build(
        monitor_id: MonitorId,
        success: bool,
        status_code: Option<u16>,
        response_time_ms: Option<u64>,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            monitor_id,
            timestamp: Utc::now(),
            success,
            status_code,
            response_time_ms,
            message,
        }
    }

    /// A response arrived; success iff `actual == expected`.
    pub fn from_status(
        monitor_id: MonitorId,
        expected: u16,
        actual: u16,
        response_time_ms: u64,
    ) -> Self {
        let success = actual == expected;
        let message = if success {
            SUCCESS_MESSAGE.to_string()
        } else {
            format!("Expected status {}, got {}", expected, actual)
        };
        Self::build(
            monitor_id,
            success,
            Some(actual),
            Some(response_time_ms),
            message,
        )
    }

    /// No response: transport error, timeout, lookup failure, or a
    /// deactivated monitor.
    pub fn failure(monitor_id: MonitorId, message: impl Into<String>) -> Self {
        Self::build(monitor_id, false, None, None, message.into())
    }

    pub fn inactive(monitor_id: MonitorId) -> Self {
        Self::failure(monitor_id, INACTIVE_MESSAGE)
    }
}
