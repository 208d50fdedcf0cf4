//! Text journal reporter.
//!
//! Human-readable log of a run: the configured queues, then for every
//! cycle each queue's quota and every grant, completions, starvation and
//! redistribution, and a closing result block.

use std::io::Write;

use super::CycleObserver;
use crate::common::ReportError;
use crate::config::Config;
use crate::model::Queue;
use crate::stats::{CycleStats, RunSummary};

const RULE: &str = "=======================================================";

/// Writes the journal into `W`.
#[derive(Debug)]
pub struct TextLogReporter<W: Write> {
    writer: W,
}

impl<W: Write> TextLogReporter<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CycleObserver for TextLogReporter<W> {
    fn on_start(&mut self, config: &Config, queues: &[Queue]) -> Result<(), ReportError> {
        let on_off = |enabled: bool| if enabled { "on" } else { "off" };
        let w = &mut self.writer;
        writeln!(w, "{RULE}")?;
        writeln!(w, "  CAP-PRO-RATA SIMULATION - DETAILED LOG")?;
        writeln!(w, "{RULE}")?;
        writeln!(w, "Total resource: {} units", config.general.total_resource)?;
        writeln!(w, "Unit: {} units", config.general.unit)?;
        writeln!(w, "Weighting: {:?}", config.weighting)?;
        writeln!(w, "Aging: {}", on_off(config.aging.enabled))?;
        writeln!(w, "Redistribution: {}\n", on_off(config.redistribution.enabled))?;
        writeln!(w, "=== INITIAL CONFIGURATION ===")?;
        for q in queues {
            writeln!(
                w,
                "{} ({}): {} processes, weight {}, cap {}",
                q.name(),
                q.policy().label(),
                q.len(),
                q.weight(),
                q.cap()
            )?;
        }
        writeln!(w)?;
        Ok(())
    }

    fn on_cycle(&mut self, stats: &CycleStats, _queues: &[Queue]) -> Result<(), ReportError> {
        let w = &mut self.writer;
        writeln!(w, "{RULE}")?;
        writeln!(w, "CYCLE {}", stats.cycle)?;
        writeln!(w, "{RULE}")?;
        for q in &stats.queues {
            writeln!(
                w,
                "\n[{}] Policy: {} | Quota: {:.2}",
                q.queue,
                q.policy.label(),
                q.quota
            )?;
            for g in &q.grants {
                writeln!(w, "  -> {} receives {:.2} units", g.process, g.amount)?;
            }
            if q.starved {
                writeln!(w, "  ! starved (aging now {:.2})", q.aging)?;
            }
        }
        for c in &stats.completed {
            writeln!(
                w,
                "  {} / {} FINISHED (duration: {} cycles)",
                c.queue, c.process, c.turnaround
            )?;
        }
        for r in &stats.redistributions {
            writeln!(
                w,
                "  redistributing {:.2} units of cap from {}: +{:.2} to {}",
                r.unused,
                r.from,
                r.share,
                r.recipients.join(", ")
            )?;
        }
        writeln!(
            w,
            "\nAllocated {:.2} units to {} processes ({:.1}% utilization)\n",
            stats.total_allocated, stats.active_processes, stats.utilization
        )?;
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        let w = &mut self.writer;
        writeln!(w, "\n{RULE}")?;
        writeln!(w, "FINAL RESULT")?;
        writeln!(w, "{RULE}")?;
        writeln!(w, "Total cycles: {}", summary.cycles)?;
        if summary.queues.iter().all(|q| q.completed == q.processes) {
            writeln!(w, "All processes finished successfully.")?;
        }
        w.flush()?;
        Ok(())
    }
}
