//! Equal-Share Dispatch.
//!
//! Splits the quota evenly between the processes still unfinished when
//! dispatch starts. Each receives one grant of
//! `min(remaining, unit, quota / active)`; what a nearly finished process
//! cannot absorb is left unspent rather than re-split.

use super::Dispatch;
use crate::model::Queue;

/// Grants every unfinished process the same slice of the quota.
pub fn dispatch(queue: &mut Queue, quota: f64, unit: f64, cycle: u64) -> Dispatch {
    let mut outcome = Dispatch::default();
    let active = queue.active_count();
    if active == 0 || quota <= 0.0 {
        return outcome;
    }

    let slice = (quota / active as f64).min(unit);
    let mut left = quota;
    for index in 0..queue.len() {
        if left <= 0.0 {
            break;
        }
        if let Some(grant) = queue.grant(index, slice.min(left), cycle) {
            left -= grant.amount;
            outcome.record(grant);
        }
    }
    outcome
}
