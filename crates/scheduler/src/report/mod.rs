//! Observers of the per-cycle statistics stream.
//!
//! Reporters never influence allocation: they receive the configuration
//! before the first cycle, each [`CycleStats`] (with read-only queues) in
//! cycle order, and the final [`RunSummary`]. It provides:
//! 1. **Console:** Cycle metrics and process tables for a terminal.
//! 2. **Text log:** A human-readable journal of every grant.
//! 3. **JSON Lines:** One structured record per line, append-only.

use crate::common::ReportError;
use crate::config::Config;
use crate::model::Queue;
use crate::stats::{CycleStats, RunSummary};

/// Terminal rendering of cycles and the final report.
pub mod console;

/// JSON Lines emission.
pub mod json;

/// Plain text journal.
pub mod log;

pub use console::ConsoleReporter;
pub use json::JsonLinesReporter;
pub use log::TextLogReporter;

/// Consumer of an allocation run.
pub trait CycleObserver {
    /// Called once before the first cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] when the observer cannot record the event.
    fn on_start(&mut self, _config: &Config, _queues: &[Queue]) -> Result<(), ReportError> {
        Ok(())
    }

    /// Called after every completed cycle, in cycle order.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] when the observer cannot record the cycle.
    fn on_cycle(&mut self, stats: &CycleStats, queues: &[Queue]) -> Result<(), ReportError>;

    /// Called once all processes are finished.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] when the observer cannot record the summary.
    fn on_finish(&mut self, _summary: &RunSummary) -> Result<(), ReportError> {
        Ok(())
    }
}

impl<O: CycleObserver + ?Sized> CycleObserver for Box<O> {
    fn on_start(&mut self, config: &Config, queues: &[Queue]) -> Result<(), ReportError> {
        (**self).on_start(config, queues)
    }

    fn on_cycle(&mut self, stats: &CycleStats, queues: &[Queue]) -> Result<(), ReportError> {
        (**self).on_cycle(stats, queues)
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        (**self).on_finish(summary)
    }
}

/// Fans every event out to each observer in order; the first error stops the fan-out.
impl CycleObserver for Vec<Box<dyn CycleObserver>> {
    fn on_start(&mut self, config: &Config, queues: &[Queue]) -> Result<(), ReportError> {
        self.iter_mut().try_for_each(|o| o.on_start(config, queues))
    }

    fn on_cycle(&mut self, stats: &CycleStats, queues: &[Queue]) -> Result<(), ReportError> {
        self.iter_mut().try_for_each(|o| o.on_cycle(stats, queues))
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.iter_mut().try_for_each(|o| o.on_finish(summary))
    }
}

/// Text progress bar of `width` cells for a fraction in `[0, 1]`.
pub(crate) fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
