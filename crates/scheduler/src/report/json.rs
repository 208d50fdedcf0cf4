//! JSON Lines reporter.
//!
//! Writes one JSON object per line: a `start` record with the setup, a
//! `cycle` record per completed cycle and a closing `summary` record.
//! Records are only ever appended.

use std::io::Write;

use serde::Serialize;

use super::CycleObserver;
use crate::common::ReportError;
use crate::config::{Config, GeneralConfig, QueueConfig, WeightingMode};
use crate::model::Queue;
use crate::stats::{CycleStats, RunSummary};

/// Line layout, discriminated by `kind`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Start {
        general: &'a GeneralConfig,
        weighting: WeightingMode,
        aging: bool,
        redistribution: bool,
        queues: &'a [QueueConfig],
    },
    Cycle(&'a CycleStats),
    Summary(&'a RunSummary),
}

/// Serializes the run as JSON Lines into `W`.
#[derive(Debug)]
pub struct JsonLinesReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesReporter<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, record: &Record<'_>) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> CycleObserver for JsonLinesReporter<W> {
    fn on_start(&mut self, config: &Config, _queues: &[Queue]) -> Result<(), ReportError> {
        self.emit(&Record::Start {
            general: &config.general,
            weighting: config.weighting,
            aging: config.aging.enabled,
            redistribution: config.redistribution.enabled,
            queues: &config.queues,
        })
    }

    fn on_cycle(&mut self, stats: &CycleStats, _queues: &[Queue]) -> Result<(), ReportError> {
        self.emit(&Record::Cycle(stats))
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.emit(&Record::Summary(summary))?;
        self.writer.flush()?;
        Ok(())
    }
}
