//! Queue state.
//!
//! A queue groups processes behind a weight, a policy and a cap. It keeps
//! the round-robin cursor and the aging accumulator between cycles, and is
//! the only place where `total_allocated` changes, so the running total
//! always matches the sum over its processes.

use serde::Serialize;

use crate::config::{Policy, QueueConfig};
use crate::model::Process;
use crate::stats::Grant;

/// A weighted group of processes sharing one quota per cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Queue {
    name: String,
    policy: Policy,
    weight: f64,
    cap: f64,
    aging: f64,
    rr_index: usize,
    total_allocated: f64,
    redistributed: bool,
    processes: Vec<Process>,
}

impl Queue {
    /// Creates an empty queue.
    pub fn new(name: impl Into<String>, weight: f64, policy: Policy, cap: f64) -> Self {
        Self {
            name: name.into(),
            policy,
            weight,
            cap,
            aging: 0.0,
            rr_index: 0,
            total_allocated: 0.0,
            redistributed: false,
            processes: Vec::new(),
        }
    }

    /// Builds a queue and its processes from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The queue entry.
    /// * `default_cap` - Cap used when the entry does not set one.
    pub fn from_config(config: &QueueConfig, default_cap: f64) -> Self {
        let mut queue = Self::new(
            config.name.clone(),
            config.weight,
            config.policy,
            config.cap.unwrap_or(default_cap),
        );
        queue.processes = config.processes.iter().map(Process::from_config).collect();
        queue
    }

    /// Appends a process at the end of the ring.
    pub fn push(&mut self, process: Process) {
        self.processes.push(process);
    }

    /// Queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch policy.
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// Static weight.
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Current cap; only grows, through redistribution.
    pub const fn cap(&self) -> f64 {
        self.cap
    }

    /// Starvation-correction accumulator.
    pub const fn aging(&self) -> f64 {
        self.aging
    }

    /// Weight used for share computation: `weight + aging`.
    pub fn boosted_weight(&self) -> f64 {
        self.weight + self.aging
    }

    /// Round-robin cursor.
    pub const fn rr_index(&self) -> usize {
        self.rr_index
    }

    /// Units granted to this queue over the whole run.
    pub const fn total_allocated(&self) -> f64 {
        self.total_allocated
    }

    /// Member processes in insertion order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Looks a member up by name.
    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name() == name)
    }

    /// Number of member processes.
    pub const fn len(&self) -> usize {
        self.processes.len()
    }

    /// True when the queue has no member at all.
    pub const fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// True when every member is finished. An empty queue is exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.processes.iter().all(Process::is_finished)
    }

    /// Number of unfinished members.
    pub fn active_count(&self) -> usize {
        self.processes.iter().filter(|p| !p.is_finished()).count()
    }

    /// Number of finished members.
    pub fn completed_count(&self) -> usize {
        self.processes.len() - self.active_count()
    }

    /// Units still owed to unfinished members.
    pub fn outstanding(&self) -> f64 {
        self.processes
            .iter()
            .filter(|p| !p.is_finished())
            .map(Process::remaining)
            .sum()
    }

    /// Total demand of all members.
    pub fn demand(&self) -> f64 {
        self.processes.iter().map(Process::demand).sum()
    }

    /// Whether this queue's exhaustion has already been redistributed.
    pub const fn is_redistributed(&self) -> bool {
        self.redistributed
    }

    /// Grants up to `offer` units to the member at `index`.
    ///
    /// Returns `None` when the member is finished (or out of range) and
    /// nothing was granted.
    pub(crate) fn grant(&mut self, index: usize, offer: f64, cycle: u64) -> Option<Grant> {
        let process = self.processes.get_mut(index)?;
        let amount = process.grant(offer, cycle);
        if amount <= 0.0 {
            return None;
        }
        self.total_allocated += amount;
        Some(Grant {
            process: process.name().to_owned(),
            amount,
            remaining: process.remaining(),
            finished: process.is_finished(),
        })
    }

    pub(crate) fn processes_mut(&mut self) -> &mut [Process] {
        &mut self.processes
    }

    pub(crate) const fn set_rr_index(&mut self, index: usize) {
        self.rr_index = index;
    }

    pub(crate) const fn set_aging(&mut self, aging: f64) {
        self.aging = aging;
    }

    pub(crate) fn raise_cap(&mut self, amount: f64) {
        self.cap += amount;
    }

    pub(crate) const fn mark_redistributed(&mut self) {
        self.redistributed = true;
    }
}
