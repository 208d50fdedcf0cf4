//! # Allocator Tests
//!
//! State machine, safeguards, snapshots and aging as seen through the
//! cycle driver.

use caprata_core::common::AllocError;
use caprata_core::config::{AgingConfig, Config, Policy, ProcessConfig, QueueConfig, WeightingMode};
use caprata_core::presets;
use caprata_core::sched::{Allocator, SimState};
use pretty_assertions::assert_eq;

use crate::common::builder;
use crate::common::harness::TestContext;

#[test]
fn test_rejects_invalid_configuration() {
    let config = builder::bare(0.0, 10.0, WeightingMode::Static);
    assert!(matches!(
        Allocator::new(config),
        Err(AllocError::InvalidConfig(_))
    ));

    let config = builder::bare(100.0, 10.0, WeightingMode::Static)
        .with_queue(builder::queue("A", 0.0, Policy::Fifo, &[10.0]));
    assert!(matches!(
        Allocator::new(config),
        Err(AllocError::InvalidConfig(_))
    ));
}

#[test]
fn test_empty_configuration_finishes_immediately() {
    let mut alloc = Allocator::new(Config::default()).unwrap();
    assert_eq!(alloc.state(), SimState::NotStarted);

    assert!(alloc.step().unwrap().is_none());
    assert_eq!(alloc.state(), SimState::Finished);
    assert!(alloc.is_finished());
    assert_eq!(alloc.cycle(), 0);
    assert!(alloc.history().is_empty());
    assert_eq!(alloc.summary().cycles, 0);
    assert_eq!(alloc.summary().mean_utilization(), 0.0);
}

#[test]
fn test_state_transitions() {
    let mut ctx = TestContext::tiered();
    assert_eq!(ctx.alloc.state(), SimState::NotStarted);

    let _ = ctx.step().unwrap();
    assert_eq!(ctx.alloc.state(), SimState::Running);
    assert_eq!(ctx.alloc.cycle(), 1);

    let _ = ctx.run();
    assert_eq!(ctx.alloc.state(), SimState::Finished);

    // Stepping a finished allocator is a no-op.
    assert!(ctx.step().is_none());
    assert_eq!(ctx.alloc.cycle(), 8);
    assert_eq!(ctx.alloc.history().len(), 8);
}

#[test]
fn test_non_convergence_safeguard() {
    let mut config = presets::tiered();
    config.general.max_cycles = 3;
    let mut alloc = Allocator::new(config).unwrap();

    for _ in 0..3 {
        assert!(alloc.step().unwrap().is_some());
    }
    let err = alloc.step().unwrap_err();
    match &err {
        AllocError::NonConvergence {
            cycle,
            queue,
            outstanding,
        } => {
            assert_eq!(*cycle, 3);
            assert_eq!(queue, "VIP");
            assert!((outstanding - 10.0).abs() < 1e-9);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.to_string().contains("no convergence after 3 cycles"));

    // The state stays at the last completed cycle.
    assert_eq!(alloc.cycle(), 3);
    assert_eq!(alloc.state(), SimState::Running);
    assert!(matches!(
        alloc.run(),
        Err(AllocError::NonConvergence { cycle: 3, .. })
    ));
}

#[test]
fn test_safeguard_not_triggered_by_finished_run() {
    let mut config = presets::tiered();
    config.general.max_cycles = 8;
    let mut alloc = Allocator::new(config).unwrap();
    assert_eq!(alloc.run().unwrap().cycles, 8);
}

#[test]
fn test_snapshot_is_detached() {
    let mut ctx = TestContext::tiered();
    let _ = ctx.step();
    let snapshot = ctx.alloc.snapshot();
    let _ = ctx.run();

    assert_eq!(snapshot.cycle, 1);
    assert_eq!(snapshot.state, SimState::Running);
    let p1 = snapshot.queues[0].process("P1").unwrap();
    assert_eq!(p1.remaining(), 20.0);
    assert_eq!(ctx.process("VVIP", "P1").remaining(), 0.0);
}

#[test]
fn test_zero_demand_queue_is_ignored() {
    let mut config = builder::bare(100.0, 10.0, WeightingMode::Static)
        .with_queue(builder::queue("IDLE", 1.0, Policy::Fifo, &[0.0]))
        .with_queue(builder::queue("BUSY", 1.0, Policy::Fifo, &[10.0]));
    config.redistribution.enabled = true;

    let mut ctx = TestContext::new(config);
    let summary = ctx.run();

    assert_eq!(summary.cycles, 1);
    let first = ctx.alloc.history().cycle(1).unwrap();
    assert!(first.queue("IDLE").is_none());
    assert_eq!(first.quota_of("BUSY"), 50.0);
    assert!(first.redistributions.is_empty());
    assert_eq!(summary.queue("IDLE").unwrap().completed, 1);
}

#[test]
fn test_conservation_and_monotonic_history() {
    let mut ctx = TestContext::tiered();
    let summary = ctx.run();

    let granted: f64 = ctx
        .alloc
        .history()
        .iter()
        .flat_map(|c| c.queues.iter())
        .flat_map(|q| q.grants.iter())
        .map(|g| g.amount)
        .sum();
    assert_eq!(granted, summary.total_allocated);
    for q in ctx.alloc.queues() {
        let sum: f64 = q.processes().iter().map(|p| p.allocated()).sum();
        assert_eq!(q.total_allocated(), sum);
        for p in q.processes() {
            assert_eq!(p.allocated(), p.demand());
        }
    }

    let cycles: Vec<u64> = ctx.alloc.history().iter().map(|c| c.cycle).collect();
    assert_eq!(cycles, (1..=8).collect::<Vec<_>>());
}

fn starving_pair() -> Config {
    let mut config = builder::bare(100.0, 1.0, WeightingMode::DemandWeighted)
        .with_queue(QueueConfig::new("A", 1.0, Policy::Fifo).with_cap(1000.0).with_process("a", 1000.0))
        .with_queue(QueueConfig::new("B", 0.01, Policy::Fifo).with_cap(1000.0).with_process("b", 1000.0));
    config.aging = AgingConfig::default();
    config
}

#[test]
fn test_starved_queue_gains_weight() {
    let mut ctx = TestContext::new(starving_pair());
    let mut previous_weight = 0.0;
    let mut previous_aging = 0.0;

    for cycle in 1..=5 {
        let stats = ctx.step().unwrap();
        let b = stats.queue("B").unwrap();
        assert!(b.starved, "cycle {cycle}");
        assert!(b.effective_weight > previous_weight, "cycle {cycle}");
        assert!(b.aging > previous_aging, "cycle {cycle}");
        previous_weight = b.effective_weight;
        previous_aging = b.aging;
    }
    assert!((ctx.queue("B").aging() - 0.5).abs() < 1e-9);
}

#[test]
fn test_starvation_detected_without_aging() {
    let mut config = starving_pair();
    config.aging = AgingConfig::disabled();
    let mut ctx = TestContext::new(config);

    let _ = ctx.step();
    let stats = ctx.step().unwrap();
    let b = stats.queue("B").unwrap();
    assert!(b.starved);
    assert_eq!(b.aging, 0.0);
}

#[test]
fn test_unserved_processes_escalate_priority() {
    let mut config = builder::bare(10.0, 10.0, WeightingMode::Static).with_queue(
        QueueConfig::new("Q", 1.0, Policy::RoundRobin)
            .with(ProcessConfig::new("P0", 30.0).with_priority(20))
            .with(ProcessConfig::new("P1", 30.0).with_priority(20))
            .with(ProcessConfig::new("P2", 30.0).with_priority(20)),
    );
    config.aging = AgingConfig::default();
    let mut ctx = TestContext::new(config);

    // No process aging on the first cycle.
    let _ = ctx.step();
    assert_eq!(ctx.process("Q", "P1").wait_time(), 0);
    assert_eq!(ctx.process("Q", "P1").priority(), 20);

    let _ = ctx.step();
    assert_eq!(ctx.process("Q", "P0").wait_time(), 1);
    assert_eq!(ctx.process("Q", "P0").priority(), 21);
    assert_eq!(ctx.process("Q", "P1").wait_time(), 0);

    let _ = ctx.step();
    assert_eq!(ctx.process("Q", "P0").wait_time(), 2);
    assert_eq!(ctx.process("Q", "P0").priority(), 22);
    assert_eq!(ctx.process("Q", "P2").priority(), 20);

    // Served again: back to the base priority.
    let _ = ctx.step();
    assert_eq!(ctx.process("Q", "P0").wait_time(), 0);
    assert_eq!(ctx.process("Q", "P0").priority(), 20);
    assert_eq!(ctx.process("Q", "P0").base_priority(), 20);
}
