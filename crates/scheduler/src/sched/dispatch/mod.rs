//! Intra-Queue Dispatch Policies.
//!
//! Consumes a queue's quota against its member processes. Every policy
//! obeys the same rules: finished processes never receive anything, a
//! single grant never exceeds `min(remaining, unit, quota left)`, and
//! dispatch stops once the quota is spent or no process is eligible.
//!
//! # Policies
//!
//! - `Fifo`: one grant per process per cycle, in insertion order.
//! - `RoundRobin`: rotating grants from a cursor persisted across cycles.
//! - `EqualShare`: the quota split evenly between unfinished processes.

use tracing::debug;

use crate::config::Policy;
use crate::model::Queue;
use crate::stats::Grant;

/// Equal-share dispatcher.
pub mod equal_share;

/// First-In, First-Out dispatcher.
pub mod fifo;

/// Round-Robin dispatcher.
pub mod round_robin;

/// Outcome of dispatching one quota.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// Grants in the order they were made.
    pub grants: Vec<Grant>,
    /// Sum of the granted units.
    pub spent: f64,
}

impl Dispatch {
    fn record(&mut self, grant: Grant) {
        self.spent += grant.amount;
        self.grants.push(grant);
    }

    /// Whether `process` received at least one grant.
    pub fn served(&self, process: &str) -> bool {
        self.grants.iter().any(|g| g.process == process)
    }
}

/// Dispatches `quota` to the processes of `queue` according to its policy.
///
/// # Arguments
///
/// * `queue` - The queue to serve; its processes, cursor and total are updated.
/// * `quota` - Budget for this cycle.
/// * `unit` - Largest single grant.
/// * `cycle` - Current cycle, recorded as start/end cycle of the processes.
pub fn dispatch(queue: &mut Queue, quota: f64, unit: f64, cycle: u64) -> Dispatch {
    let outcome = match queue.policy() {
        Policy::Fifo => fifo::dispatch(queue, quota, unit, cycle),
        Policy::RoundRobin => round_robin::dispatch(queue, quota, unit, cycle),
        Policy::EqualShare => equal_share::dispatch(queue, quota, unit, cycle),
    };
    for grant in &outcome.grants {
        debug!(
            queue = queue.name(),
            process = %grant.process,
            amount = grant.amount,
            remaining = grant.remaining,
            "grant"
        );
    }
    outcome
}
