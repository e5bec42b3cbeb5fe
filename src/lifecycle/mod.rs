//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     AppConfig → repository, recorder, notifier, executor → Scheduler
//!
//! Shutdown (shutdown.rs):
//!     trigger → reconciliation loop exits → schedules cancelled
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → main stops the scheduler and flushes runs
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Ordered shutdown: stop scheduling, stop serving, flush run history

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::wait_for_signal;
pub use startup::{build_app, App, StartupError};
