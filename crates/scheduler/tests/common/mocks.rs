use caprata_core::common::ReportError;
use caprata_core::config::Config;
use caprata_core::model::Queue;
use caprata_core::report::CycleObserver;
use caprata_core::stats::{CycleStats, RunSummary};
use mockall::mock;

mock! {
    pub Observer {}
    impl CycleObserver for Observer {
        fn on_start(&mut self, config: &Config, queues: &[Queue]) -> Result<(), ReportError>;
        fn on_cycle(&mut self, stats: &CycleStats, queues: &[Queue]) -> Result<(), ReportError>;
        fn on_finish(&mut self, summary: &RunSummary) -> Result<(), ReportError>;
    }
}
