//! Allocation core.
//!
//! Each cycle runs the same pipeline over the queues the allocator owns:
//! 1. **Quota:** Split the pool between active queues (`quota`).
//! 2. **Dispatch:** Consume each quota against the queue's processes (`dispatch`).
//! 3. **Aging:** Detect starvation and adjust queue aging and process priority (`aging`).
//! 4. **Redistribution:** Hand part of an exhausted queue's cap to the others (`redistribution`).

/// Starvation detection and aging updates.
pub mod aging;

/// Cycle driver and state machine.
pub mod allocator;

/// Intra-queue dispatch policies.
pub mod dispatch;

/// Per-queue quota computation.
pub mod quota;

/// Cap redistribution from exhausted queues.
pub mod redistribution;

pub use allocator::{Allocator, SimState, Snapshot};
pub use dispatch::Dispatch;
pub use quota::Quota;
