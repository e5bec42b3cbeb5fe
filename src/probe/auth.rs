//! Request header construction for probes.
//!
//! Headers start from the fixed user agent, then the monitor's auth
//! descriptor is layered on top. Header-set auth is merged verbatim and
//! may override the user agent.

use base64::{engine::general_purpose, Engine};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};

use crate::monitor::AuthDescriptor;

/// User agent sent with every probe.
pub const PROBE_USER_AGENT: &str = "PulsePing-Monitor/1.0";

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("Invalid header name '{0}'")]
    Name(String),
    #[error("Invalid value for header '{0}'")]
    Value(String),
}

/// Build the full header set for a probe.
///
/// Empty bearer tokens and basic credentials with an empty half add
/// nothing, matching how half-filled auth forms are stored.
pub fn build_headers(auth: &AuthDescriptor) -> Result<HeaderMap, HeaderError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(PROBE_USER_AGENT));

    match auth {
        AuthDescriptor::None => {}
        AuthDescriptor::Bearer { token } => {
            if !token.is_empty() {
                headers.insert(AUTHORIZATION, header_value("Authorization", &format!("Bearer {}", token))?);
            }
        }
        AuthDescriptor::Basic { username, password } => {
            if !username.is_empty() && !password.is_empty() {
                let encoded = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
                headers.insert(AUTHORIZATION, header_value("Authorization", &format!("Basic {}", encoded))?);
            }
        }
        AuthDescriptor::Header { headers: extra } => {
            for (key, value) in extra {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| HeaderError::Name(key.clone()))?;
                headers.insert(name, header_value(key, value)?);
            }
        }
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, HeaderError> {
    HeaderValue::from_str(value).map_err(|_| HeaderError::Value(name.to_string()))
}
