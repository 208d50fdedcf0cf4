//! Reference scenarios.
//!
//! - `tiered`: three service tiers (VVIP, VIP, CLASSIC) sharing 100 units
//!   in grants of 10, round-robin for the premium tiers and FIFO for the
//!   last one.
//! - `dynamic`: three capped priority bands (HIGH, MEDIUM, LOW) splitting
//!   their quota evenly, where starvation aging and cap redistribution do
//!   the balancing.

use crate::config::{
    AgingConfig, Config, GeneralConfig, Policy, ProcessConfig, QueueConfig, RedistributionConfig,
    WeightingMode,
};

/// Names accepted by [`by_name`].
pub const PRESETS: &[&str] = &["tiered", "dynamic"];

/// Looks a preset up by name.
pub fn by_name(name: &str) -> Option<Config> {
    match name {
        "tiered" => Some(tiered()),
        "dynamic" => Some(dynamic()),
        _ => None,
    }
}

/// Three service tiers over a pool of 100 units, grants of 10, static weighting.
pub fn tiered() -> Config {
    Config {
        general: GeneralConfig {
            total_resource: 100.0,
            unit: 10.0,
            ..GeneralConfig::default()
        },
        weighting: WeightingMode::Static,
        aging: AgingConfig::default(),
        redistribution: RedistributionConfig::default(),
        queues: vec![
            QueueConfig::new("VVIP", 0.5, Policy::RoundRobin)
                .with(ProcessConfig::new("P1", 50.0).with_priority(1))
                .with(ProcessConfig::new("P2", 30.0).with_priority(1)),
            QueueConfig::new("VIP", 0.3, Policy::RoundRobin)
                .with(ProcessConfig::new("P3", 60.0).with_priority(2))
                .with(ProcessConfig::new("P4", 40.0).with_priority(2)),
            QueueConfig::new("CLASSIC", 0.2, Policy::Fifo)
                .with(ProcessConfig::new("P5", 80.0).with_priority(3))
                .with(ProcessConfig::new("P6", 20.0).with_priority(3)),
        ],
    }
}

/// Three capped bands with equal-share dispatch, aging and redistribution.
pub fn dynamic() -> Config {
    Config {
        general: GeneralConfig {
            total_resource: 100.0,
            unit: 100.0,
            ..GeneralConfig::default()
        },
        weighting: WeightingMode::Static,
        aging: AgingConfig {
            rate: 0.1,
            ..AgingConfig::default()
        },
        redistribution: RedistributionConfig {
            enabled: true,
            factor: 0.2,
        },
        queues: vec![
            QueueConfig::new("HIGH", 3.0, Policy::EqualShare)
                .with_cap(50.0)
                .with_process("P1", 40.0)
                .with_process("P2", 25.0),
            QueueConfig::new("MEDIUM", 2.0, Policy::EqualShare)
                .with_cap(35.0)
                .with_process("P3", 30.0)
                .with_process("P4", 25.0),
            QueueConfig::new("LOW", 1.0, Policy::EqualShare)
                .with_cap(25.0)
                .with_process("P5", 20.0)
                .with_process("P6", 15.0),
        ],
    }
}
