//! Console reporter.
//!
//! Renders the initial configuration, each cycle's metrics with a process
//! table per queue, and the final summary. Colors and screen control are
//! left to the terminal; only plain text is written.

use std::io::{self, Stdout, Write};

use super::{CycleObserver, progress_bar};
use crate::common::ReportError;
use crate::config::Config;
use crate::model::Queue;
use crate::sched::quota;
use crate::stats::{CycleStats, RunSummary};

const BAR_WIDTH: usize = 10;

/// Writes tables into `W`, stdout by default.
#[derive(Debug)]
pub struct ConsoleReporter<W: Write = Stdout> {
    writer: W,
    sections: Vec<String>,
}

impl ConsoleReporter<Stdout> {
    /// Reporter printing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            sections: Vec::new(),
        }
    }

    /// Restricts the final report to the given summary sections.
    #[must_use]
    pub fn with_sections(mut self, sections: Vec<String>) -> Self {
        self.sections = sections;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn queue_table(&mut self, queues: &[Queue]) -> io::Result<()> {
        let w = &mut self.writer;
        for q in queues {
            writeln!(w, "  --- {} [{}] ---", q.name(), q.policy().label())?;
            writeln!(
                w,
                "  {:<10} {:>9} {:>9} {:>9}  {:<12} state",
                "process", "demand", "remaining", "allocated", "progress"
            )?;
            for p in q.processes() {
                writeln!(
                    w,
                    "  {:<10} {:>9.1} {:>9.1} {:>9.1}  {:<12} {}",
                    p.name(),
                    p.demand(),
                    p.remaining(),
                    p.allocated(),
                    progress_bar(p.progress(), BAR_WIDTH),
                    if p.is_finished() { "done" } else { "waiting" }
                )?;
            }
            writeln!(
                w,
                "  {}/{} finished | allocated {:.1}/{:.1} units\n",
                q.completed_count(),
                q.len(),
                q.total_allocated(),
                q.demand()
            )?;
        }
        Ok(())
    }
}

impl<W: Write> CycleObserver for ConsoleReporter<W> {
    fn on_start(&mut self, config: &Config, queues: &[Queue]) -> Result<(), ReportError> {
        let pool = config.general.total_resource;
        let quotas = quota::compute(queues, pool, config.weighting);
        {
            let w = &mut self.writer;
            writeln!(w, "\nINITIAL CONFIGURATION")?;
            writeln!(
                w,
                "  pool: {pool:.1} units, unit: {:.1}, weighting: {:?}",
                config.general.unit, config.weighting
            )?;
            for (i, q) in queues.iter().enumerate() {
                let first_quota = quotas
                    .iter()
                    .find(|quota| quota.index == i)
                    .map_or(0.0, |quota| quota.quota);
                writeln!(
                    w,
                    "  queue {}: {} | policy {} | weight {:.3} | first-cycle quota {:.1} | cap {:.1} | {} processes",
                    i + 1,
                    q.name(),
                    q.policy().label(),
                    q.weight(),
                    first_quota,
                    q.cap(),
                    q.len()
                )?;
            }
            writeln!(w)?;
        }
        self.queue_table(queues)?;
        Ok(())
    }

    fn on_cycle(&mut self, stats: &CycleStats, queues: &[Queue]) -> Result<(), ReportError> {
        {
            let w = &mut self.writer;
            writeln!(w, "\nCYCLE {}", stats.cycle)?;
            writeln!(w, "  active processes : {}", stats.active_processes)?;
            writeln!(w, "  allocated        : {:.2} units", stats.total_allocated)?;
            writeln!(w, "  utilization      : {:.1}%", stats.utilization)?;
            for q in &stats.queues {
                writeln!(
                    w,
                    "  {:<18} quota {:>7.2} cap {:>7.2} spent {:>7.2}{}",
                    q.queue,
                    q.quota,
                    q.cap,
                    q.allocated,
                    if q.starved { "  (starved)" } else { "" }
                )?;
            }
            writeln!(w)?;
        }
        self.queue_table(queues)?;
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        summary.write_sections(&mut self.writer, &self.sections)?;
        self.writer.flush()?;
        Ok(())
    }
}
