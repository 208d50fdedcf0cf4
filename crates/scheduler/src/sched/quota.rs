//! Quota computation.
//!
//! Converts queue weights (plus aging) and, in demand-weighted mode, the
//! outstanding demand of each queue into a per-cycle budget. Only queues
//! with at least one unfinished process receive a quota, and every quota
//! is clamped to the queue's cap, so `Σ quota ≤ R` always holds.

use crate::config::WeightingMode;
use crate::model::Queue;

/// Budget assigned to one queue for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    /// Position of the queue in the allocator.
    pub index: usize,
    /// Weight that entered the share computation.
    pub effective_weight: f64,
    /// Pre-clamp share of the pool.
    pub share: f64,
    /// Budget after the cap clamp.
    pub quota: f64,
}

/// Effective weight of a queue under `mode`.
///
/// `weight + aging` in static mode, multiplied by the outstanding demand
/// in demand-weighted mode.
pub fn effective_weight(queue: &Queue, mode: WeightingMode) -> f64 {
    match mode {
        WeightingMode::Static => queue.boosted_weight(),
        WeightingMode::DemandWeighted => queue.boosted_weight() * queue.outstanding(),
    }
}

/// Computes the quota of every active queue, in queue order.
///
/// Static mode divides by the weight of every configured queue, exhausted or
/// not, so the share of an exhausted queue stays unused. Demand-weighted mode
/// only divides by active queues. An empty result means nothing is left to
/// allocate.
///
/// # Arguments
///
/// * `queues` - All queues of the simulation.
/// * `total_resource` - The pool `R`.
/// * `mode` - Weighting mode.
pub fn compute(queues: &[Queue], total_resource: f64, mode: WeightingMode) -> Vec<Quota> {
    let denominator: f64 = match mode {
        WeightingMode::Static => queues.iter().map(Queue::boosted_weight).sum(),
        WeightingMode::DemandWeighted => queues
            .iter()
            .filter(|q| !q.is_exhausted())
            .map(|q| effective_weight(q, mode))
            .sum(),
    };
    if denominator <= 0.0 {
        return Vec::new();
    }

    queues
        .iter()
        .enumerate()
        .filter(|(_, q)| !q.is_exhausted())
        .map(|(index, q)| {
            let effective_weight = effective_weight(q, mode);
            let share = total_resource * effective_weight / denominator;
            Quota {
                index,
                effective_weight,
                share,
                quota: share.min(q.cap()),
            }
        })
        .collect()
}
