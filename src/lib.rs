//! Uptime monitoring scheduler library.
//!
//! Keeps one repeating timer per active monitor, reconciles that set
//! against the monitor catalog, and runs each check through the
//! lookup → probe → record → notify pipeline.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod monitor;
pub mod notify;
pub mod observability;
pub mod probe;
pub mod runs;
pub mod scheduler;

pub use config::AppConfig;
pub use lifecycle::Shutdown;
pub use scheduler::Scheduler;
