use async_trait::async_trait;

use super::{FailureNotifier, NotifyError};
use crate::probe::ProbeOutcome;

/// Writes alerts to the log. The default when no delivery channel is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl FailureNotifier for LogNotifier {
    async fn notify_failure(
        &self,
        destination: &str,
        monitor_name: &str,
        url: &str,
        outcome: &ProbeOutcome,
    ) -> Result<(), NotifyError> {
        tracing::warn!(
            to = %destination,
            monitor = %monitor_name,
            url = %url,
            status = ?outcome.status_code,
            message = %outcome.message,
            "Monitor is DOWN"
        );
        Ok(())
    }
}
