//! # Reporter Tests
//!
//! Observer call order through the allocator, error propagation, and the
//! output of the bundled reporters.

use std::io::{BufRead, BufReader};

use caprata_core::common::{ReportError, SimError};
use caprata_core::config::WeightingMode;
use caprata_core::presets;
use caprata_core::report::{ConsoleReporter, CycleObserver, JsonLinesReporter, TextLogReporter};
use caprata_core::sched::SimState;
use mockall::Sequence;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::harness::TestContext;
use crate::common::mocks::MockObserver;

#[test]
fn test_observer_call_order() {
    let mut seq = Sequence::new();
    let mut observer = MockObserver::new();

    let _ = observer
        .expect_on_start()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|config, queues| config.queues.len() == 3 && queues.len() == 3)
        .returning(|_, _| Ok(()));
    for cycle in 1..=8u64 {
        let _ = observer
            .expect_on_cycle()
            .times(1)
            .in_sequence(&mut seq)
            .withf(move |stats, _| stats.cycle == cycle)
            .returning(|_, _| Ok(()));
    }
    let _ = observer
        .expect_on_finish()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|summary| summary.cycles == 8)
        .returning(|_| Ok(()));

    let mut ctx = TestContext::tiered();
    let summary = ctx.alloc.run_with(&mut observer).unwrap();
    assert_eq!(summary.cycles, 8);
}

#[test]
fn test_observer_error_leaves_allocator_consistent() {
    let mut observer = MockObserver::new();
    let _ = observer.expect_on_start().returning(|_, _| Ok(()));
    let _ = observer.expect_on_cycle().returning(|stats, _| {
        if stats.cycle == 2 {
            Err(ReportError::Io(std::io::Error::other("sink closed")))
        } else {
            Ok(())
        }
    });
    let _ = observer.expect_on_finish().never();

    let mut ctx = TestContext::tiered();
    let err = ctx.alloc.run_with(&mut observer).unwrap_err();
    assert!(matches!(err, SimError::Report(ReportError::Io(_))));
    assert_eq!(ctx.alloc.cycle(), 2);
    assert_eq!(ctx.alloc.history().len(), 2);

    // The run can be resumed without the failing observer.
    assert_eq!(ctx.run().cycles, 8);
}

#[test]
fn test_resumed_run_skips_on_start() {
    let mut observer = MockObserver::new();
    let _ = observer.expect_on_start().never();
    let _ = observer.expect_on_cycle().times(7).returning(|_, _| Ok(()));
    let _ = observer.expect_on_finish().times(1).returning(|_| Ok(()));

    let mut ctx = TestContext::tiered();
    let _ = ctx.step();
    let _ = ctx.alloc.run_with(&mut observer).unwrap();
    assert_eq!(ctx.alloc.state(), SimState::Finished);
}

#[test]
fn test_fan_out_to_all_observers() {
    let mut first = MockObserver::new();
    let _ = first.expect_on_start().times(1).returning(|_, _| Ok(()));
    let _ = first.expect_on_cycle().times(8).returning(|_, _| Ok(()));
    let _ = first.expect_on_finish().times(1).returning(|_| Ok(()));
    let mut second = MockObserver::new();
    let _ = second.expect_on_start().times(1).returning(|_, _| Ok(()));
    let _ = second.expect_on_cycle().times(8).returning(|_, _| Ok(()));
    let _ = second.expect_on_finish().times(1).returning(|_| Ok(()));

    let mut observers: Vec<Box<dyn CycleObserver>> = vec![Box::new(first), Box::new(second)];
    let mut ctx = TestContext::tiered();
    let _ = ctx.alloc.run_with(&mut observers).unwrap();
}

#[test]
fn test_json_lines_to_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut reporter = JsonLinesReporter::new(file.reopen().unwrap());

    let mut ctx = TestContext::tiered();
    let _ = ctx.alloc.run_with(&mut reporter).unwrap();
    drop(reporter);

    let lines: Vec<Value> = BufReader::new(file.reopen().unwrap())
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect();
    assert_eq!(lines.len(), 10);

    assert_eq!(lines[0]["kind"], "start");
    assert_eq!(lines[0]["general"]["total_resource"], 100.0);
    assert_eq!(lines[0]["queues"][0]["policy"], "RR");

    for (i, line) in lines[1..9].iter().enumerate() {
        assert_eq!(line["kind"], "cycle");
        assert_eq!(line["cycle"], i as u64 + 1);
    }
    assert_eq!(lines[1]["total_allocated"], 100.0);
    assert_eq!(lines[1]["queues"][0]["grants"][0]["process"], "P1");

    assert_eq!(lines[9]["kind"], "summary");
    assert_eq!(lines[9]["cycles"], 8);
}

#[test]
fn test_text_log_journal() {
    let mut reporter = TextLogReporter::new(Vec::new());
    let mut ctx = TestContext::tiered();
    let _ = ctx.alloc.run_with(&mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner()).unwrap();

    assert!(text.contains("VVIP (RR): 2 processes, weight 0.5"));
    assert!(text.contains("CYCLE 1\n"));
    assert!(text.contains("[VVIP] Policy: RR | Quota: 50.00"));
    assert!(text.contains("  -> P1 receives 10.00 units"));
    assert!(text.contains("CLASSIC / P5 FINISHED (duration: 8 cycles)"));
    assert!(text.contains("redistributing 20.00 units of cap from VVIP"));
    assert!(text.contains("Total cycles: 8"));
    assert!(text.contains("All processes finished successfully."));
}

#[test]
fn test_console_report() {
    let mut reporter = ConsoleReporter::new(Vec::new()).with_sections(vec!["summary".to_owned()]);
    let mut ctx = TestContext::tiered();
    let _ = ctx.alloc.run_with(&mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner()).unwrap();

    assert!(text.contains("INITIAL CONFIGURATION"));
    assert!(text.contains("first-cycle quota 50.0"));
    assert!(text.contains("CYCLE 8"));
    assert!(text.contains("[##########]"));
    assert!(text.contains("CAP-PRO-RATA ALLOCATION SUMMARY"));
    assert!(text.contains("sim_cycles               8"));
    assert!(!text.contains("PROCESSES"));
}

#[test]
fn test_console_quota_follows_weighting_mode() {
    let config = presets::tiered().with_weighting(WeightingMode::DemandWeighted);
    let mut reporter = ConsoleReporter::new(Vec::new());
    let mut ctx = TestContext::new(config);
    let _ = ctx.alloc.run_with(&mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner()).unwrap();

    // 0.5 * 80 against 0.3 * 100 and 0.2 * 100.
    assert!(text.contains("weighting: DemandWeighted"));
    assert!(text.contains("VVIP | policy RR | weight 0.500 | first-cycle quota 44.4"));
    assert!(text.contains("VIP | policy RR | weight 0.300 | first-cycle quota 33.3"));
    assert!(text.contains("CLASSIC | policy FIFO | weight 0.200 | first-cycle quota 22.2"));
    assert!(!text.contains("first-cycle quota 50.0"));
}

#[test]
fn test_summary_sections() {
    let mut ctx = TestContext::tiered();
    let summary = ctx.run();

    let mut out = Vec::new();
    summary.write_sections(&mut out, &[]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("QUEUES"));
    assert!(text.contains("PROCESSES"));
    assert!(text.contains("mean_utilization         35.00%"));

    let mut out = Vec::new();
    summary.write_sections(&mut out, &["queues".to_owned()]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("sim_cycles"));
    assert!(text.contains("VVIP"));
}
