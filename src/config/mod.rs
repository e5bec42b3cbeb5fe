//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to each subsystem at boot
//! ```
//!
//! The monitor catalog is NOT part of this config: it is the scheduler's
//! source of truth and is re-read every reconciliation pass by
//! `monitor::repository::FileMonitorRepository`.
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, MonitorsConfig, NotificationConfig, NotifierKind,
    ObservabilityConfig, OverlapPolicy, RunsConfig, SchedulerConfig,
};
