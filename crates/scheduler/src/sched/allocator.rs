//! Allocator: owns every queue and drives the cycles.
//!
//! A simulation moves through `NotStarted → Running → Finished`. Each call
//! to [`Allocator::step`] either applies one complete cycle (quota, dispatch,
//! aging, redistribution) and appends its [`CycleStats`] to the history, or
//! observes that no process is left and finishes. A cycle is never left
//! half-applied, so the allocator can be inspected between any two steps.

use serde::Serialize;
use tracing::{debug, info};

use super::{aging, dispatch, quota, redistribution};
use crate::common::{AllocError, SimError};
use crate::config::Config;
use crate::model::{Process, Queue};
use crate::report::CycleObserver;
use crate::stats::{Completion, CycleStats, History, QueueCycle, RunSummary};

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimState {
    /// No cycle has been attempted yet.
    NotStarted,
    /// At least one cycle ran and work may remain.
    Running,
    /// Every process is finished.
    Finished,
}

/// Owned copy of the allocator state at an inter-cycle boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Last completed cycle.
    pub cycle: u64,
    /// Simulation state.
    pub state: SimState,
    /// Queues and their processes.
    pub queues: Vec<Queue>,
}

/// Two-level cap-pro-rata allocator.
#[derive(Debug)]
pub struct Allocator {
    config: Config,
    queues: Vec<Queue>,
    history: History,
    cycle: u64,
    state: SimState,
}

impl Allocator {
    /// Validates `config` and builds the queues.
    ///
    /// Queues that hold no unfinished process from the start never trigger
    /// redistribution.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] when validation fails.
    pub fn new(config: Config) -> Result<Self, AllocError> {
        config.validate()?;
        let default_cap = config.default_cap();
        let queues = config
            .queues
            .iter()
            .map(|q| {
                let mut queue = Queue::from_config(q, default_cap);
                if queue.is_exhausted() {
                    queue.mark_redistributed();
                }
                queue
            })
            .collect();

        Ok(Self {
            config,
            queues,
            history: History::default(),
            cycle: 0,
            state: SimState::NotStarted,
        })
    }

    /// Configuration the allocator was built with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Queues in declaration order.
    pub fn queues(&self) -> &[Queue] {
        &self.queues
    }

    /// Looks a queue up by name.
    pub fn queue(&self, name: &str) -> Option<&Queue> {
        self.queues.iter().find(|q| q.name() == name)
    }

    /// Records of all completed cycles.
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Last completed cycle, zero before the first.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Current state.
    pub const fn state(&self) -> SimState {
        self.state
    }

    /// True once the allocator has observed that every process finished.
    pub fn is_finished(&self) -> bool {
        self.state == SimState::Finished
    }

    /// True when no queue has an unfinished process.
    fn all_finished(&self) -> bool {
        self.queues.iter().all(Queue::is_exhausted)
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycle: self.cycle,
            state: self.state,
            queues: self.queues.clone(),
        }
    }

    /// Final statistics for the state reached so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_queues(self.cycle, self.config.general.total_resource, &self.queues)
    }

    /// Runs one cycle.
    ///
    /// Completion is checked before the cycle starts: when every process is
    /// finished the allocator moves to `Finished` and returns `Ok(None)`.
    /// Otherwise the cycle is applied in full and its record is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::NonConvergence`] when `max_cycles` cycles have
    /// run and work remains. The state is left untouched, so repeated calls
    /// keep returning the same error.
    pub fn step(&mut self) -> Result<Option<&CycleStats>, AllocError> {
        if self.state == SimState::Finished {
            return Ok(None);
        }
        if self.all_finished() {
            self.state = SimState::Finished;
            info!(cycles = self.cycle, "all processes finished");
            return Ok(None);
        }
        if self.cycle >= self.config.general.max_cycles {
            return Err(self.non_convergence());
        }

        self.state = SimState::Running;
        let stats = self.run_cycle();
        Ok(Some(self.history.push(stats)))
    }

    /// Steps until every process is finished.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::NonConvergence`] when the safeguard trips.
    pub fn run(&mut self) -> Result<RunSummary, AllocError> {
        while self.step()?.is_some() {}
        Ok(self.summary())
    }

    /// Steps until every process is finished, notifying `observer` along the way.
    ///
    /// `on_start` is only called when the run has not started yet; `on_cycle`
    /// follows each completed cycle, in order; `on_finish` receives the summary.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Alloc`] when the allocation fails and
    /// [`SimError::Report`] when the observer does. In both cases the
    /// allocator state stays consistent at the last completed cycle.
    pub fn run_with<O>(&mut self, observer: &mut O) -> Result<RunSummary, SimError>
    where
        O: CycleObserver + ?Sized,
    {
        if self.state == SimState::NotStarted {
            observer.on_start(&self.config, &self.queues)?;
        }
        while self.step()?.is_some() {
            if let Some(stats) = self.history.last() {
                observer.on_cycle(stats, &self.queues)?;
            }
        }
        let summary = self.summary();
        observer.on_finish(&summary)?;
        Ok(summary)
    }

    fn non_convergence(&self) -> AllocError {
        let (queue, outstanding) = self
            .queues
            .iter()
            .find(|q| !q.is_exhausted())
            .map_or_else(
                || (String::new(), 0.0),
                |q| (q.name().to_owned(), q.outstanding()),
            );
        AllocError::NonConvergence {
            cycle: self.cycle,
            queue,
            outstanding,
        }
    }

    fn run_cycle(&mut self) -> CycleStats {
        self.cycle += 1;
        let cycle = self.cycle;
        let general = &self.config.general;
        let aging_config = &self.config.aging;

        let quotas = quota::compute(&self.queues, general.total_resource, self.config.weighting);
        let mut entries = Vec::with_capacity(quotas.len());
        let mut completed = Vec::new();

        for q in &quotas {
            let queue = &mut self.queues[q.index];
            let cap = queue.cap();
            let outcome = dispatch::dispatch(queue, q.quota, general.unit, cycle);

            let starved = aging::update_queue(queue, q.quota, cap, aging_config);
            if aging_config.enabled && cycle > 1 {
                aging::age_unserved(queue, &outcome, aging_config.priority_factor);
            }

            for grant in outcome.grants.iter().filter(|g| g.finished) {
                let turnaround = queue
                    .process(&grant.process)
                    .and_then(Process::turnaround)
                    .unwrap_or(1);
                info!(
                    cycle,
                    queue = queue.name(),
                    process = %grant.process,
                    turnaround,
                    "process finished"
                );
                completed.push(Completion {
                    queue: queue.name().to_owned(),
                    process: grant.process.clone(),
                    turnaround,
                });
            }

            debug!(
                cycle,
                queue = queue.name(),
                quota = q.quota,
                spent = outcome.spent,
                starved,
                "queue dispatched"
            );
            entries.push(QueueCycle {
                queue: queue.name().to_owned(),
                policy: queue.policy(),
                effective_weight: q.effective_weight,
                quota: q.quota,
                cap,
                allocated: outcome.spent,
                unspent: (q.quota - outcome.spent).max(0.0),
                starved,
                aging: queue.aging(),
                rr_index: queue.rr_index(),
                grants: outcome.grants,
            });
        }

        let redistributions = if self.config.redistribution.enabled {
            redistribution::redistribute(&mut self.queues, self.config.redistribution.factor)
        } else {
            Vec::new()
        };

        let total_allocated: f64 = entries.iter().map(|e| e.allocated).sum();
        let active_processes = entries.iter().map(QueueCycle::served).sum();
        let utilization = total_allocated / self.config.general.total_resource * 100.0;
        info!(
            cycle,
            total_allocated,
            active_processes,
            utilization,
            "cycle complete"
        );

        CycleStats {
            cycle,
            total_allocated,
            active_processes,
            utilization,
            queues: entries,
            completed,
            redistributions,
        }
    }
}
