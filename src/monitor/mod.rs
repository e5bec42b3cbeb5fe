//! Monitor definitions and the repository the scheduler reads them from.
//!
//! # Data Flow
//! ```text
//! catalog (TOML file / in-memory store)
//!     → repository.rs (list active, fetch one config)
//!     → scheduler reconciliation (coarse: id, name, interval)
//!     → scheduler pipeline (full config per firing)
//! ```
//!
//! # Design Decisions
//! - The repository is read-only from the scheduler's point of view
//! - Interval bounds are enforced at the catalog boundary, not in timers

pub mod repository;
pub mod types;

pub use repository::{
    FileMonitorRepository, InMemoryMonitorRepository, MonitorRepository, RepositoryError,
};
pub use types::{
    interval_in_bounds, ActiveMonitor, AuthDescriptor, HttpMethod, MonitorConfig, MonitorId,
    MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};
