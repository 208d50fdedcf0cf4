//! Common utilities and types used throughout the allocator.
//!
//! This module provides building blocks shared by every other module. It includes:
//! 1. **Constants:** Default thresholds, rates and safeguards for a simulation.
//! 2. **Error Handling:** Configuration, allocation, reporting and driver error types.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for configuration, allocation and reporting.
pub mod error;

pub use error::{AllocError, ConfigError, ReportError, SimError};
