//! Run history subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline firing
//!     → recorder.rs (append one outcome)
//!     → admin API / CLI (recent N, stats.rs summary)
//! ```
//!
//! # Design Decisions
//! - Appends are never retried; a failed write loses that outcome
//! - In-memory store is capped per monitor to bound growth
//! - JSON snapshot is loaded at boot and written at shutdown

pub mod recorder;
pub mod stats;

pub use recorder::{MemoryRunRecorder, RecordError, RunRecorder};
pub use stats::{DailyUptime, DayStatus, LastStatus, RunStats};
