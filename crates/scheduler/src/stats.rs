//! Allocation statistics collection and reporting.
//!
//! This module holds the records a run produces. It provides:
//! 1. **Cycle records:** `CycleStats`, one per completed cycle, with the per-queue
//!    quota/cap/aging picture and every individual grant.
//! 2. **History:** The append-only, cycle-ordered log of those records.
//! 3. **Summaries:** End-of-run totals per queue and per process, with
//!    selective section printing.

use std::collections::HashSet;
use std::io::{self, Write};

use serde::Serialize;

use crate::config::Policy;
use crate::model::{Process, Queue};

/// One grant delivered to a process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    /// Receiving process.
    pub process: String,
    /// Units granted.
    pub amount: f64,
    /// Units the process still owes after this grant.
    pub remaining: f64,
    /// Whether this grant finished the process.
    pub finished: bool,
}

/// What one queue received and did during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueCycle {
    /// Queue name.
    pub queue: String,
    /// Dispatch policy used.
    pub policy: Policy,
    /// Weight that entered the share computation.
    pub effective_weight: f64,
    /// Quota after the cap clamp.
    pub quota: f64,
    /// Cap in force for this cycle.
    pub cap: f64,
    /// Units actually granted.
    pub allocated: f64,
    /// Quota left unspent by the dispatcher.
    pub unspent: f64,
    /// Whether the quota fell under the starvation threshold.
    pub starved: bool,
    /// Aging after this cycle's update.
    pub aging: f64,
    /// Round-robin cursor after dispatch.
    pub rr_index: usize,
    /// Grants in dispatch order.
    pub grants: Vec<Grant>,
}

impl QueueCycle {
    /// Units granted to `process` during the cycle.
    pub fn allocated_to(&self, process: &str) -> f64 {
        self.grants
            .iter()
            .filter(|g| g.process == process)
            .map(|g| g.amount)
            .sum()
    }

    /// Number of distinct processes that received at least one grant.
    pub fn served(&self) -> usize {
        self.grants
            .iter()
            .map(|g| g.process.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// A process that finished during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Queue holding the process.
    pub queue: String,
    /// Finished process.
    pub process: String,
    /// Cycles from first grant to completion, both included.
    pub turnaround: u64,
}

/// Cap handed out after a queue exhausted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Redistribution {
    /// Queue that exhausted.
    pub from: String,
    /// `factor * cap` of the exhausted queue.
    pub unused: f64,
    /// Cap increase applied to each recipient.
    pub share: f64,
    /// Queues still active at the time.
    pub recipients: Vec<String>,
}

/// Immutable record of one completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleStats {
    /// Cycle number, starting at 1.
    pub cycle: u64,
    /// Units granted across all queues.
    pub total_allocated: f64,
    /// Distinct processes that received at least one grant.
    pub active_processes: usize,
    /// `total_allocated` as a percentage of the pool.
    pub utilization: f64,
    /// One entry per queue that was active at the start of the cycle.
    pub queues: Vec<QueueCycle>,
    /// Processes that finished during the cycle.
    pub completed: Vec<Completion>,
    /// Redistribution events triggered at the end of the cycle.
    pub redistributions: Vec<Redistribution>,
}

impl CycleStats {
    /// Entry for the named queue, if it was active this cycle.
    pub fn queue(&self, name: &str) -> Option<&QueueCycle> {
        self.queues.iter().find(|q| q.queue == name)
    }

    /// Quota of the named queue, zero when it was not active.
    pub fn quota_of(&self, name: &str) -> f64 {
        self.queue(name).map_or(0.0, |q| q.quota)
    }

    /// Sum of all quotas handed out.
    pub fn total_quota(&self) -> f64 {
        self.queues.iter().map(|q| q.quota).sum()
    }
}

/// Append-only, cycle-ordered log of [`CycleStats`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct History {
    cycles: Vec<CycleStats>,
}

impl History {
    pub(crate) fn push(&mut self, stats: CycleStats) -> &CycleStats {
        self.cycles.push(stats);
        let last = self.cycles.len() - 1;
        &self.cycles[last]
    }

    /// Iterates over the records in cycle order.
    pub fn iter(&self) -> std::slice::Iter<'_, CycleStats> {
        self.cycles.iter()
    }

    /// Record of the given cycle (1-based).
    pub fn cycle(&self, cycle: u64) -> Option<&CycleStats> {
        let index = usize::try_from(cycle.checked_sub(1)?).ok()?;
        self.cycles.get(index)
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&CycleStats> {
        self.cycles.last()
    }

    /// Number of completed cycles.
    pub const fn len(&self) -> usize {
        self.cycles.len()
    }

    /// True before the first cycle.
    pub const fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a CycleStats;
    type IntoIter = std::slice::Iter<'a, CycleStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.cycles.iter()
    }
}

/// Final figures for one queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSummary {
    /// Queue name.
    pub name: String,
    /// Dispatch policy.
    pub policy: Policy,
    /// Units granted over the run.
    pub total_allocated: f64,
    /// Total demand of the members.
    pub demand: f64,
    /// Finished members.
    pub completed: usize,
    /// All members.
    pub processes: usize,
    /// Mean turnaround of the finished members, zero when none finished.
    pub avg_turnaround: f64,
    /// Cap at the end of the run.
    pub final_cap: f64,
    /// Aging at the end of the run.
    pub final_aging: f64,
}

/// Final figures for one process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    /// Queue holding the process.
    pub queue: String,
    /// Process name.
    pub name: String,
    /// Total units required.
    pub demand: f64,
    /// Units granted.
    pub allocated: f64,
    /// First served cycle.
    pub start_cycle: Option<u64>,
    /// Completion cycle.
    pub end_cycle: Option<u64>,
    /// Cycles from first grant to completion, both included.
    pub turnaround: Option<u64>,
}

/// Section names for selective summary output.
///
/// Valid section identifiers: `"summary"`, `"queues"`, `"processes"`.
/// Pass an empty slice to `write_sections` to write all sections.
pub const SUMMARY_SECTIONS: &[&str] = &["summary", "queues", "processes"];

/// End-of-run statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Completed cycles.
    pub cycles: u64,
    /// Pool size.
    pub total_resource: f64,
    /// Demand over all processes.
    pub total_demand: f64,
    /// Units granted over all cycles.
    pub total_allocated: f64,
    /// Per-queue figures in declaration order.
    pub queues: Vec<QueueSummary>,
    /// Per-process figures, grouped by queue.
    pub processes: Vec<ProcessSummary>,
}

impl RunSummary {
    /// Builds the summary from the final queue state.
    pub fn from_queues(cycles: u64, total_resource: f64, queues: &[Queue]) -> Self {
        let mut processes = Vec::new();
        let queue_summaries = queues
            .iter()
            .map(|q| {
                let turnarounds: Vec<u64> =
                    q.processes().iter().filter_map(Process::turnaround).collect();
                let avg_turnaround = if turnarounds.is_empty() {
                    0.0
                } else {
                    turnarounds.iter().sum::<u64>() as f64 / turnarounds.len() as f64
                };
                processes.extend(q.processes().iter().map(|p| ProcessSummary {
                    queue: q.name().to_owned(),
                    name: p.name().to_owned(),
                    demand: p.demand(),
                    allocated: p.allocated(),
                    start_cycle: p.start_cycle(),
                    end_cycle: p.end_cycle(),
                    turnaround: p.turnaround(),
                }));
                QueueSummary {
                    name: q.name().to_owned(),
                    policy: q.policy(),
                    total_allocated: q.total_allocated(),
                    demand: q.demand(),
                    completed: q.completed_count(),
                    processes: q.len(),
                    avg_turnaround,
                    final_cap: q.cap(),
                    final_aging: q.aging(),
                }
            })
            .collect::<Vec<_>>();

        Self {
            cycles,
            total_resource,
            total_demand: queue_summaries.iter().map(|q| q.demand).sum(),
            total_allocated: queue_summaries.iter().map(|q| q.total_allocated).sum(),
            queues: queue_summaries,
            processes,
        }
    }

    /// Summary entry for the named queue.
    pub fn queue(&self, name: &str) -> Option<&QueueSummary> {
        self.queues.iter().find(|q| q.name == name)
    }

    /// Summary entry for a process.
    pub fn process(&self, queue: &str, name: &str) -> Option<&ProcessSummary> {
        self.processes
            .iter()
            .find(|p| p.queue == queue && p.name == name)
    }

    /// Mean utilization over the run, as a percentage of the pool.
    pub fn mean_utilization(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.total_allocated / (self.total_resource * self.cycles as f64) * 100.0
    }

    /// Writes only the requested sections to `out`.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"queues"` or
    /// `"processes"`. Pass an empty slice to write all sections.
    ///
    /// # Errors
    ///
    /// Propagates any error of the underlying writer.
    pub fn write_sections<W: Write + ?Sized>(
        &self,
        out: &mut W,
        sections: &[String],
    ) -> io::Result<()> {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("summary") {
            writeln!(out, "\n==========================================================")?;
            writeln!(out, "CAP-PRO-RATA ALLOCATION SUMMARY")?;
            writeln!(out, "==========================================================")?;
            writeln!(out, "sim_cycles               {}", self.cycles)?;
            writeln!(out, "pool_size                {:.2}", self.total_resource)?;
            writeln!(out, "total_demand             {:.2}", self.total_demand)?;
            writeln!(out, "total_allocated          {:.2}", self.total_allocated)?;
            writeln!(out, "mean_utilization         {:.2}%", self.mean_utilization())?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("queues") {
            writeln!(out, "QUEUES")?;
            for q in &self.queues {
                writeln!(
                    out,
                    "  {:<18} [{:<5}] allocated: {:>9.2}/{:<9.2} done: {}/{}  avg_turnaround: {:.1}  cap: {:.2}",
                    q.name,
                    q.policy.label(),
                    q.total_allocated,
                    q.demand,
                    q.completed,
                    q.processes,
                    q.avg_turnaround,
                    q.final_cap
                )?;
            }
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("processes") {
            let cycle = |c: Option<u64>| c.map_or_else(|| "-".to_owned(), |c| format!("C{c}"));
            writeln!(out, "PROCESSES")?;
            for p in &self.processes {
                writeln!(
                    out,
                    "  {:<18} {:<10} demand: {:>8.1}  allocated: {:>8.1}  start: {:>5}  end: {:>5}  turnaround: {}",
                    p.queue,
                    p.name,
                    p.demand,
                    p.allocated,
                    cycle(p.start_cycle),
                    cycle(p.end_cycle),
                    p.turnaround.map_or_else(|| "-".to_owned(), |t| t.to_string())
                )?;
            }
        }
        writeln!(out, "==========================================================")
    }
}
