//! Allocation state: processes and the queues that own them.
//!
//! Both types keep their fields private so the allocator remains the only
//! writer; reporters read them through accessors or serialized snapshots.

/// Demand counters with lifecycle and aging state.
pub mod process;

/// Weighted, capped groups of processes.
pub mod queue;

pub use crate::config::Policy;
pub use process::{Process, ProcessState};
pub use queue::Queue;
