//! Scheduler subsystem.
//!
//! # Data Flow
//! ```text
//! reconcile.rs (every reconcile interval, plus once at start)
//!     → MonitorRepository::list_active_monitors
//!     → registry.rs (add / remove / reschedule timers)
//!
//! registry.rs timer tick
//!     → service.rs fire wrapper (overlap policy, panic isolation)
//!     → pipeline.rs (lookup → probe → record → notify)
//! ```
//!
//! # Design Decisions
//! - At most one timer per monitor ID, enforced by the registry
//! - Each firing runs in its own task; a slow or panicking check never
//!   delays another monitor or the next tick
//! - A failed repository fetch leaves existing schedules running

pub mod pipeline;
pub mod reconcile;
pub mod registry;
pub mod service;
pub mod status;

pub use pipeline::{HealthCheckPipeline, PANICKED_MESSAGE};
pub use reconcile::{PassReport, Reconciler};
pub use registry::{FireFn, RegistryError, ScheduleRegistry};
pub use service::Scheduler;
pub use status::{ScheduledMonitor, SchedulerStatus};
