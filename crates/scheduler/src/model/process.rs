//! Process state.
//!
//! A process is a synthetic demand counter. Grants move units from
//! `remaining` to `allocated`; the process finishes the instant nothing is
//! owed. Aging only escalates its priority, it never changes dispatch order.

use serde::Serialize;

use crate::common::constants::MIN_PRIORITY;
use crate::config::ProcessConfig;

/// Lifecycle of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Never granted anything yet.
    Pending,
    /// Received at least one grant, still owed units.
    Active,
    /// Nothing left to grant.
    Finished,
}

/// A demand counter competing for its queue's quota.
#[derive(Debug, Clone, Serialize)]
pub struct Process {
    name: String,
    demand: f64,
    remaining: f64,
    allocated: f64,
    priority: u32,
    base_priority: u32,
    wait_time: u64,
    start_cycle: Option<u64>,
    end_cycle: Option<u64>,
    finished: bool,
}

impl Process {
    /// Creates a process owing its whole demand.
    ///
    /// A process with zero demand is finished from the start.
    pub fn new(name: impl Into<String>, demand: f64, priority: u32) -> Self {
        Self {
            name: name.into(),
            demand,
            remaining: demand,
            allocated: 0.0,
            priority,
            base_priority: priority,
            wait_time: 0,
            start_cycle: None,
            end_cycle: None,
            finished: demand <= 0.0,
        }
    }

    /// Builds a process from its configuration entry.
    pub fn from_config(config: &ProcessConfig) -> Self {
        Self::new(config.name.clone(), config.demand, config.priority)
    }

    /// Process name, unique within its queue.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total units required.
    pub const fn demand(&self) -> f64 {
        self.demand
    }

    /// Units still owed.
    pub const fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Units granted so far.
    pub const fn allocated(&self) -> f64 {
        self.allocated
    }

    /// Current, possibly escalated, priority.
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    /// Priority the process was configured with.
    pub const fn base_priority(&self) -> u32 {
        self.base_priority
    }

    /// Consecutive cycles spent unserved while unfinished.
    pub const fn wait_time(&self) -> u64 {
        self.wait_time
    }

    /// First cycle in which the process received a grant.
    pub const fn start_cycle(&self) -> Option<u64> {
        self.start_cycle
    }

    /// Cycle in which the process finished.
    pub const fn end_cycle(&self) -> Option<u64> {
        self.end_cycle
    }

    /// True once `remaining` has reached zero.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Lifecycle state derived from the grant history.
    pub const fn state(&self) -> ProcessState {
        if self.finished {
            ProcessState::Finished
        } else if self.start_cycle.is_some() {
            ProcessState::Active
        } else {
            ProcessState::Pending
        }
    }

    /// Cycles between the first grant and completion, both included.
    pub const fn turnaround(&self) -> Option<u64> {
        match (self.start_cycle, self.end_cycle) {
            (Some(start), Some(end)) => Some(end - start + 1),
            _ => None,
        }
    }

    /// Fraction of the demand already granted, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.demand <= 0.0 {
            1.0
        } else {
            (self.allocated / self.demand).clamp(0.0, 1.0)
        }
    }

    /// Grants up to `offer` units during `cycle` and returns what was granted.
    ///
    /// The grant never exceeds `remaining`, so taking the full remainder
    /// leaves exactly zero behind. Finished processes get nothing.
    pub(crate) fn grant(&mut self, offer: f64, cycle: u64) -> f64 {
        if self.finished || offer <= 0.0 {
            return 0.0;
        }
        let amount = offer.min(self.remaining);
        self.remaining -= amount;
        self.allocated += amount;
        self.wait_time = 0;
        self.priority = self.base_priority;
        if self.start_cycle.is_none() {
            self.start_cycle = Some(cycle);
        }
        if self.remaining <= 0.0 {
            self.finished = true;
            self.end_cycle = Some(cycle);
        }
        amount
    }

    /// Records one more unserved cycle and escalates the priority.
    ///
    /// `priority = max(1, floor(base * (1 + factor * wait_time)))`.
    pub(crate) fn age(&mut self, factor: f64) {
        self.wait_time += 1;
        let scale = factor.mul_add(self.wait_time as f64, 1.0);
        let escalated = (self.base_priority as f64 * scale).floor();
        self.priority = (escalated as u32).max(MIN_PRIORITY);
    }
}
