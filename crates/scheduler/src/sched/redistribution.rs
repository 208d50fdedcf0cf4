//! Redistribution of freed capacity.
//!
//! When a queue exhausts, `factor * cap` of it is split evenly between the
//! queues that are still active by raising their caps. Each queue triggers
//! this at most once; the new caps apply from the next cycle.

use tracing::warn;

use crate::model::Queue;
use crate::stats::Redistribution;

/// Redistributes the cap of every newly exhausted queue.
///
/// Returns one event per exhausted queue that had recipients. A queue that
/// exhausts while no other queue is active is marked but hands nothing out.
pub fn redistribute(queues: &mut [Queue], factor: f64) -> Vec<Redistribution> {
    let mut events = Vec::new();

    for from in 0..queues.len() {
        if queues[from].is_redistributed() || !queues[from].is_exhausted() {
            continue;
        }
        queues[from].mark_redistributed();

        let recipients: Vec<usize> = (0..queues.len())
            .filter(|&i| !queues[i].is_exhausted())
            .collect();
        if recipients.is_empty() {
            continue;
        }

        let unused = factor * queues[from].cap();
        let share = unused / recipients.len() as f64;
        for &i in &recipients {
            queues[i].raise_cap(share);
        }

        warn!(
            from = queues[from].name(),
            unused,
            share,
            recipients = recipients.len(),
            "redistributing exhausted queue cap"
        );
        events.push(Redistribution {
            from: queues[from].name().to_owned(),
            unused,
            share,
            recipients: recipients
                .iter()
                .map(|&i| queues[i].name().to_owned())
                .collect(),
        });
    }
    events
}
