//! Cap-pro-rata resource allocation simulator library.
//!
//! This crate implements a cycle-driven two-level allocator with the following:
//! 1. **Model:** Processes (demand counters) grouped into weighted, capped queues.
//! 2. **Quotas:** Static or demand-weighted shares of a fixed resource pool, aging-adjusted.
//! 3. **Dispatch:** FIFO, Round-Robin and Equal-Share policies consuming a queue's quota.
//! 4. **Correction:** Starvation detection, queue aging, and redistribution of freed caps.
//! 5. **Reporting:** Immutable per-cycle statistics and observers that render or serialize them.

/// Common types and constants (errors, thresholds, tolerances).
pub mod common;
/// Simulation configuration (defaults, enums, JSON loading, validation).
pub mod config;
/// Process and queue state.
pub mod model;
/// Ready-made configurations reproducing the reference scenarios.
pub mod presets;
/// Observers consuming the per-cycle statistics stream.
pub mod report;
/// Allocation core (quotas, dispatch, aging, redistribution, cycle driver).
pub mod sched;
/// Per-cycle statistics records and end-of-run summaries.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main allocator type; owns every queue and the cycle history.
pub use crate::sched::Allocator;
/// Immutable record of one completed cycle.
pub use crate::stats::CycleStats;
