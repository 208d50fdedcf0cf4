//! System-wide constants.
//!
//! These values are the baseline parameters of a simulation when the
//! configuration does not override them.

/// Fraction of a queue's cap below which a quota counts as starvation.
pub const STARVATION_THRESHOLD: f64 = 0.1;

/// Amount added to a starved queue's aging accumulator each cycle.
pub const AGING_RATE: f64 = 0.1;

/// Amount removed from a queue's aging accumulator after a non-starved cycle.
pub const AGING_DECAY: f64 = 0.05;

/// Per-cycle priority escalation factor for unserved processes.
pub const PRIORITY_AGING_FACTOR: f64 = 0.05;

/// Fraction of an exhausted queue's cap handed to the still-active queues.
pub const REDISTRIBUTION_FACTOR: f64 = 0.2;

/// Cycle count after which a run is declared non-convergent.
pub const MAX_CYCLES: u64 = 10_000;

/// Lowest priority value an escalated process can take.
pub const MIN_PRIORITY: u32 = 1;
