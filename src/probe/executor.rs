//! Probe executor.
//!
//! # Responsibilities
//! - Issue exactly one HTTP request per call
//! - Bound it by the probe timeout
//! - Classify the result into a `ProbeOutcome`
//!
//! The executor never persists or notifies; the pipeline does that.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::{redirect, Client};

use crate::monitor::MonitorConfig;
use crate::probe::auth::build_headers;
use crate::probe::outcome::ProbeOutcome;

/// Default bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REDIRECTS: usize = 10;

/// Stateless HTTP prober. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ProbeExecutor {
    client: Client,
    timeout: Duration,
}

impl ProbeExecutor {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a monitor once. Transport problems come back as failed
    /// outcomes, never as errors.
    pub async fn execute(&self, monitor: &MonitorConfig) -> ProbeOutcome {
        let headers = match build_headers(&monitor.auth) {
            Ok(headers) => headers,
            Err(e) => return ProbeOutcome::failure(monitor.id.clone(), e.to_string()),
        };

        let request = self
            .client
            .request(monitor.method.as_reqwest(), &monitor.url)
            .headers(headers);

        let started = Instant::now();
        match request.send().await {
            Ok(response) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                ProbeOutcome::from_status(
                    monitor.id.clone(),
                    monitor.expected_status,
                    response.status().as_u16(),
                    elapsed_ms,
                )
            }
            Err(e) => {
                let message = if e.is_timeout() {
                    format!("Request timed out after {}s", self.timeout.as_secs())
                } else {
                    error_chain(&e)
                };
                ProbeOutcome::failure(monitor.id.clone(), message)
            }
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
