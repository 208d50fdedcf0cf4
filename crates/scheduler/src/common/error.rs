//! Error definitions.
//!
//! This module defines every failure the allocator can surface. It provides:
//! 1. **Configuration Errors:** Rejected parameters, detected before the first cycle.
//! 2. **Allocation Errors:** Terminal conditions of a run (invalid setup, non-convergence).
//! 3. **Reporting Errors:** I/O and serialization failures of observers.
//! 4. **Driver Errors:** The union of the two above, returned by observed runs.

use std::io;

use thiserror::Error;

/// Reasons a configuration is refused.
///
/// All of these are detected by [`Config::validate`](crate::config::Config::validate)
/// before any quota is computed, so a run never divides by zero.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The resource pool is zero or negative.
    #[error("total resource must be positive, got {0}")]
    NonPositiveResource(f64),

    /// The per-grant unit is zero or negative.
    #[error("allocation unit must be positive, got {0}")]
    NonPositiveUnit(f64),

    /// A queue has a zero or negative weight.
    #[error("queue `{queue}` has non-positive weight {weight}")]
    NonPositiveWeight {
        /// Offending queue.
        queue: String,
        /// Configured weight.
        weight: f64,
    },

    /// A queue has a zero or negative cap.
    #[error("queue `{queue}` has non-positive cap {cap}")]
    NonPositiveCap {
        /// Offending queue.
        queue: String,
        /// Configured cap.
        cap: f64,
    },

    /// A process asks for a negative amount of resource.
    #[error("process `{process}` in queue `{queue}` has negative demand {demand}")]
    NegativeDemand {
        /// Queue holding the process.
        queue: String,
        /// Offending process.
        process: String,
        /// Configured demand.
        demand: f64,
    },

    /// A numeric parameter is NaN or infinite.
    #[error("`{field}` must be a finite number")]
    NonFinite {
        /// Path of the parameter, e.g. `queues[VIP].weight`.
        field: String,
    },

    /// Two queues share a name.
    #[error("duplicate queue name `{0}`")]
    DuplicateQueue(String),

    /// Two processes of the same queue share a name.
    #[error("duplicate process `{process}` in queue `{queue}`")]
    DuplicateProcess {
        /// Queue holding both processes.
        queue: String,
        /// Repeated name.
        process: String,
    },

    /// A fraction-valued parameter lies outside `[0, 1]`.
    #[error("`{field}` must lie in [0, 1], got {value}")]
    FactorOutOfRange {
        /// Parameter name.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// A rate that must not be negative is.
    #[error("`{field}` must not be negative, got {value}")]
    NegativeParameter {
        /// Parameter name.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// The non-convergence safeguard was set to zero cycles.
    #[error("max_cycles must be at least 1")]
    ZeroMaxCycles,

    /// The configuration document is not valid JSON for [`Config`](crate::config::Config).
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] io::Error),
}

/// Terminal failures of an allocation run.
#[derive(Debug, Error)]
pub enum AllocError {
    /// The allocator refused to start.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The cycle safeguard was reached with demand still outstanding.
    #[error("no convergence after {cycle} cycles: `{queue}` still owes {outstanding} units")]
    NonConvergence {
        /// Last completed cycle.
        cycle: u64,
        /// First queue that still has unfinished processes.
        queue: String,
        /// Units still owed by that queue.
        outstanding: f64,
    },
}

/// Failures of a [`CycleObserver`](crate::report::CycleObserver).
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing to the sink failed.
    #[error("report I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Serializing a record failed.
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by observed runs.
#[derive(Debug, Error)]
pub enum SimError {
    /// The allocation itself failed.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// An observer failed; the allocator state is still consistent.
    #[error(transparent)]
    Report(#[from] ReportError),
}
