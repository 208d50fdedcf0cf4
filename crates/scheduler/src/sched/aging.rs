//! Starvation detection and aging.
//!
//! A queue is starved when its quota falls below a fraction (10% by
//! default) of its own cap. Starved queues accumulate aging, which boosts
//! their effective weight from the next cycle on; any other cycle decays
//! aging back toward zero. Processes left unserved escalate their priority.

use tracing::warn;

use super::Dispatch;
use crate::config::AgingConfig;
use crate::model::Queue;

/// Whether `quota` counts as starvation for a queue capped at `cap`.
pub fn is_starved(quota: f64, cap: f64, threshold: f64) -> bool {
    quota < threshold * cap
}

/// Next aging value: `+rate` when starved, otherwise `max(0, aging - decay)`.
pub fn next_aging(aging: f64, starved: bool, config: &AgingConfig) -> f64 {
    if starved {
        aging + config.rate
    } else {
        (aging - config.decay).max(0.0)
    }
}

/// Updates the aging of a queue that received `quota` and returns whether it was starved.
///
/// Starvation is always detected; aging only changes when enabled.
pub fn update_queue(queue: &mut Queue, quota: f64, cap: f64, config: &AgingConfig) -> bool {
    let starved = is_starved(quota, cap, config.starvation_threshold);
    if !config.enabled {
        return starved;
    }
    let aging = next_aging(queue.aging(), starved, config);
    if starved {
        warn!(queue = queue.name(), quota, cap, aging, "queue starved");
    }
    queue.set_aging(aging);
    starved
}

/// Escalates the priority of every unfinished process that `dispatch` did not serve.
pub fn age_unserved(queue: &mut Queue, dispatch: &Dispatch, factor: f64) {
    for process in queue.processes_mut() {
        if !process.is_finished() && !dispatch.served(process.name()) {
            process.age(factor);
        }
    }
}
