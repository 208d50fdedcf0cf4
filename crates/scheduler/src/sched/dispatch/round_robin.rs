//! Round-Robin Dispatch.
//!
//! Visits the ring from the persisted cursor, one process per step, and
//! grants `min(remaining, unit, quota left)` to each unfinished one. The
//! cursor advances after every visit and is stored back on the queue, so
//! the next cycle resumes exactly where this one stopped.
//!
//! The walk ends when the quota is spent or after `n` consecutive visits
//! that produced no grant, which bounds it when every member is finished.

use super::Dispatch;
use crate::model::Queue;

/// Rotates grants around the queue until the quota or the work runs out.
pub fn dispatch(queue: &mut Queue, quota: f64, unit: f64, cycle: u64) -> Dispatch {
    let mut outcome = Dispatch::default();
    let n = queue.len();
    if n == 0 {
        return outcome;
    }

    let mut left = quota;
    let mut index = queue.rr_index() % n;
    let mut skips = 0;

    while left > 0.0 && skips < n {
        match queue.grant(index, unit.min(left), cycle) {
            Some(grant) => {
                left -= grant.amount;
                outcome.record(grant);
                skips = 0;
            }
            None => skips += 1,
        }
        index = (index + 1) % n;
    }

    queue.set_rr_index(index);
    outcome
}
