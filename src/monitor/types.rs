//! Monitor data model.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest accepted probing interval.
pub const MIN_INTERVAL_SECS: u64 = 10;
/// Largest accepted probing interval (24 hours).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Opaque monitor identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(String);

impl MonitorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MonitorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MonitorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// HTTP method used for the probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Credentials attached to every probe of a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthDescriptor {
    #[default]
    None,
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    /// Arbitrary headers merged verbatim into the request.
    Header {
        headers: BTreeMap<String, String>,
    },
}

/// Full probing configuration of one monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub id: MonitorId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub auth: AuthDescriptor,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Where failure alerts for this monitor's owner are delivered.
    #[serde(default)]
    pub notify_address: Option<String>,
}

fn default_expected_status() -> u16 {
    200
}

fn default_interval_secs() -> u64 {
    60
}

fn default_active() -> bool {
    true
}

impl MonitorConfig {
    /// A GET monitor expecting 200 with no auth, active, probing every minute.
    pub fn new(id: impl Into<MonitorId>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            method: HttpMethod::Get,
            expected_status: default_expected_status(),
            auth: AuthDescriptor::None,
            interval_secs: default_interval_secs(),
            active: true,
            notify_address: None,
        }
    }

    pub fn summary(&self) -> ActiveMonitor {
        ActiveMonitor {
            id: self.id.clone(),
            name: self.name.clone(),
            interval_secs: self.interval_secs,
        }
    }

    /// Check the monitor against the accepted ranges. Returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        let name_len = self.name.chars().count();
        if name_len == 0 {
            problems.push("name is required".to_string());
        } else if name_len > 255 {
            problems.push("name must be less than 255 characters".to_string());
        }
        if let Err(e) = url::Url::parse(&self.url) {
            problems.push(format!("url '{}' is not valid: {}", self.url, e));
        }
        if !(100..=599).contains(&self.expected_status) {
            problems.push(format!(
                "expected_status {} is outside 100..=599",
                self.expected_status
            ));
        }
        if !interval_in_bounds(self.interval_secs) {
            problems.push(format!(
                "interval_secs {} is outside {}..={}",
                self.interval_secs, MIN_INTERVAL_SECS, MAX_INTERVAL_SECS
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// The coarse view of an active monitor used for scheduling decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMonitor {
    pub id: MonitorId,
    pub name: String,
    pub interval_secs: u64,
}

pub fn interval_in_bounds(secs: u64) -> bool {
    (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs)
}
