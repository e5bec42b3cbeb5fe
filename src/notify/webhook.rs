use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{FailureAlert, FailureNotifier, NotifyError};
use crate::probe::ProbeOutcome;

/// Delivers alerts by POSTing a JSON `FailureAlert` to a fixed endpoint.
/// The owner's address travels in the `to` field for the relay to act on.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: url::Url,
}

impl WebhookNotifier {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let endpoint = url::Url::parse(endpoint)
            .map_err(|e| NotifyError::InvalidDestination(format!("{}: {}", endpoint, e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl FailureNotifier for WebhookNotifier {
    async fn notify_failure(
        &self,
        destination: &str,
        monitor_name: &str,
        url: &str,
        outcome: &ProbeOutcome,
    ) -> Result<(), NotifyError> {
        let alert = FailureAlert::new(destination, monitor_name, url, outcome);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&alert)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %destination, monitor = %monitor_name, "Failure alert delivered");
        Ok(())
    }
}
