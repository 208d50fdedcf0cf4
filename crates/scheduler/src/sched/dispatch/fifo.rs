//! First-In, First-Out (FIFO) Dispatch.
//!
//! Walks the queue once in insertion order. Each unfinished process gets a
//! single grant of `min(remaining, unit, quota left)`; finished processes
//! are skipped without consuming anything. Quota left over after the walk
//! is not handed out again in the same cycle.

use super::Dispatch;
use crate::model::Queue;

/// Serves every unfinished process once, in order, while quota remains.
pub fn dispatch(queue: &mut Queue, quota: f64, unit: f64, cycle: u64) -> Dispatch {
    let mut outcome = Dispatch::default();
    let mut left = quota;

    for index in 0..queue.len() {
        if left <= 0.0 {
            break;
        }
        if let Some(grant) = queue.grant(index, unit.min(left), cycle) {
            left -= grant.amount;
            outcome.record(grant);
        }
    }
    outcome
}
