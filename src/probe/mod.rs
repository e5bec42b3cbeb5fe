//! Probe execution subsystem.
//!
//! # Data Flow
//! ```text
//! MonitorConfig
//!     → auth.rs (user agent + auth headers)
//!     → executor.rs (one bounded HTTP request)
//!     → outcome.rs (success / mismatch / transport failure)
//! ```
//!
//! # Design Decisions
//! - Success means the exact expected status, not "any 2xx"
//! - Redirects are followed; the final status is what counts
//! - No response means no status code and no response time

pub mod auth;
pub mod executor;
pub mod outcome;

pub use executor::{ProbeExecutor, DEFAULT_PROBE_TIMEOUT};
pub use outcome::{ProbeOutcome, INACTIVE_MESSAGE, SUCCESS_MESSAGE};
