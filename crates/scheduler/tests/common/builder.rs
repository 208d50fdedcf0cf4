use caprata_core::config::{
    AgingConfig, Config, GeneralConfig, Policy, QueueConfig, RedistributionConfig, WeightingMode,
};

/// Configuration with the given pool and unit, no queues, aging and redistribution off.
pub fn bare(total_resource: f64, unit: f64, weighting: WeightingMode) -> Config {
    Config {
        general: GeneralConfig {
            total_resource,
            unit,
            ..GeneralConfig::default()
        },
        weighting,
        aging: AgingConfig::disabled(),
        redistribution: RedistributionConfig::disabled(),
        queues: Vec::new(),
    }
}

/// Queue named `name` holding processes `{name}0..` with the given demands.
pub fn queue(name: &str, weight: f64, policy: Policy, demands: &[f64]) -> QueueConfig {
    demands
        .iter()
        .enumerate()
        .fold(QueueConfig::new(name, weight, policy), |q, (i, d)| {
            q.with_process(format!("{name}{i}"), *d)
        })
}
