//! Configuration system for the allocator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! a simulation. It provides:
//! 1. **Defaults:** Baseline pool size, grant unit, aging and redistribution constants.
//! 2. **Structures:** Hierarchical config for general, aging, redistribution and queues.
//! 3. **Enums:** Weighting mode and intra-queue dispatch policy.
//! 4. **Loading:** JSON parsing and validation.
//!
//! Configuration is supplied as a JSON document (`Config::from_file`) or built in code,
//! see [`crate::presets`] for the reference scenarios.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::common::constants;

/// Default configuration constants for a simulation.
///
/// These values define the baseline setup when not explicitly overridden
/// in the configuration document.
mod defaults {
    /// Size of the resource pool distributed each cycle.
    pub const TOTAL_RESOURCE: f64 = 100.0;

    /// Largest amount a single grant may deliver to one process.
    pub const UNIT: f64 = 10.0;

    /// Priority assigned to processes that do not declare one.
    pub const PRIORITY: u32 = 1;
}

/// How a cycle's pool is split between queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeightingMode {
    /// Share proportional to `weight + aging`, over every configured queue.
    ///
    /// The denominator never shrinks, so the share of an exhausted queue is
    /// simply left unused.
    #[default]
    Static,
    /// Share proportional to `(weight + aging) * outstanding demand`, over active queues.
    ///
    /// A nearly drained queue stops claiming a full static share.
    #[serde(alias = "Demand")]
    DemandWeighted,
}

/// Intra-queue dispatch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Policy {
    /// One grant per unfinished process per cycle, in insertion order.
    #[default]
    #[serde(rename = "FIFO", alias = "Fifo")]
    Fifo,
    /// Grants rotate around the queue from a cursor that persists across cycles.
    #[serde(rename = "RR", alias = "RoundRobin")]
    RoundRobin,
    /// The quota is split evenly between the processes still running.
    #[serde(rename = "EQUAL", alias = "EqualShare")]
    EqualShare,
}

impl Policy {
    /// Short label used by reporters.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::RoundRobin => "RR",
            Self::EqualShare => "EQUAL",
        }
    }
}

/// Root configuration for a simulation.
///
/// Aggregates the general parameters, the weighting mode, the two
/// correction mechanisms and the queue layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pool size, grant unit and safeguard.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Queue share computation.
    #[serde(default)]
    pub weighting: WeightingMode,

    /// Starvation detection and aging.
    #[serde(default)]
    pub aging: AgingConfig,

    /// Cap redistribution from exhausted queues.
    #[serde(default)]
    pub redistribution: RedistributionConfig,

    /// Queues in declaration order.
    #[serde(default)]
    pub queues: Vec<QueueConfig>,
}

impl Config {
    /// Parses a configuration document.
    ///
    /// The document is only parsed; call [`Config::validate`] (or build an
    /// [`Allocator`](crate::sched::Allocator), which validates) before use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the JSON does not match the structure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Appends a queue, builder style.
    #[must_use]
    pub fn with_queue(mut self, queue: QueueConfig) -> Self {
        self.queues.push(queue);
        self
    }

    /// Replaces the weighting mode, builder style.
    #[must_use]
    pub const fn with_weighting(mut self, weighting: WeightingMode) -> Self {
        self.weighting = weighting;
        self
    }

    /// Cap applied to a queue that does not configure one: the whole pool.
    pub const fn default_cap(&self) -> f64 {
        self.general.total_resource
    }

    /// Checks every parameter a run depends on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, in this order: general
    /// parameters, aging, redistribution, then each queue and its processes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let general = &self.general;
        finite("general.total_resource", general.total_resource)?;
        finite("general.unit", general.unit)?;
        if general.total_resource <= 0.0 {
            return Err(ConfigError::NonPositiveResource(general.total_resource));
        }
        if general.unit <= 0.0 {
            return Err(ConfigError::NonPositiveUnit(general.unit));
        }
        if general.max_cycles == 0 {
            return Err(ConfigError::ZeroMaxCycles);
        }

        self.aging.validate()?;
        fraction("redistribution.factor", self.redistribution.factor)?;

        let mut queue_names = HashSet::new();
        for queue in &self.queues {
            if !queue_names.insert(queue.name.as_str()) {
                return Err(ConfigError::DuplicateQueue(queue.name.clone()));
            }
            queue.validate()?;
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Resource pool `R` distributed every cycle
    #[serde(default = "GeneralConfig::default_total_resource")]
    pub total_resource: f64,

    /// Maximum units a single grant may deliver
    #[serde(default = "GeneralConfig::default_unit")]
    pub unit: f64,

    /// Cycles after which a still-running simulation is declared non-convergent
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default pool size.
    const fn default_total_resource() -> f64 {
        defaults::TOTAL_RESOURCE
    }

    /// Returns the default grant unit.
    const fn default_unit() -> f64 {
        defaults::UNIT
    }

    /// Returns the default non-convergence safeguard.
    const fn default_max_cycles() -> u64 {
        constants::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            total_resource: defaults::TOTAL_RESOURCE,
            unit: defaults::UNIT,
            max_cycles: constants::MAX_CYCLES,
        }
    }
}

/// Starvation detection and aging parameters.
///
/// Queue aging boosts the effective weight of a starved queue; process
/// aging escalates the priority of processes left unserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingConfig {
    /// Enable queue and process aging
    #[serde(default = "AgingConfig::default_enabled")]
    pub enabled: bool,

    /// Added to a queue's aging on each starved cycle
    #[serde(default = "AgingConfig::default_rate")]
    pub rate: f64,

    /// Removed from a queue's aging on each non-starved cycle
    #[serde(default = "AgingConfig::default_decay")]
    pub decay: f64,

    /// Fraction of the cap under which a quota counts as starvation
    #[serde(default = "AgingConfig::default_starvation_threshold")]
    pub starvation_threshold: f64,

    /// Priority escalation per unserved cycle
    #[serde(default = "AgingConfig::default_priority_factor")]
    pub priority_factor: f64,
}

impl AgingConfig {
    /// Aging is on unless explicitly disabled.
    const fn default_enabled() -> bool {
        true
    }

    /// Returns the default aging rate.
    const fn default_rate() -> f64 {
        constants::AGING_RATE
    }

    /// Returns the default aging decay.
    const fn default_decay() -> f64 {
        constants::AGING_DECAY
    }

    /// Returns the default starvation threshold.
    const fn default_starvation_threshold() -> f64 {
        constants::STARVATION_THRESHOLD
    }

    /// Returns the default priority escalation factor.
    const fn default_priority_factor() -> f64 {
        constants::PRIORITY_AGING_FACTOR
    }

    /// Configuration with aging switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("aging.rate", self.rate)?;
        non_negative("aging.decay", self.decay)?;
        non_negative("aging.priority_factor", self.priority_factor)?;
        fraction("aging.starvation_threshold", self.starvation_threshold)
    }
}

impl Default for AgingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: constants::AGING_RATE,
            decay: constants::AGING_DECAY,
            starvation_threshold: constants::STARVATION_THRESHOLD,
            priority_factor: constants::PRIORITY_AGING_FACTOR,
        }
    }
}

/// Redistribution of the cap freed by exhausted queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedistributionConfig {
    /// Enable redistribution
    #[serde(default = "RedistributionConfig::default_enabled")]
    pub enabled: bool,

    /// Fraction of the exhausted queue's cap that is handed out
    #[serde(default = "RedistributionConfig::default_factor")]
    pub factor: f64,
}

impl RedistributionConfig {
    /// Redistribution is on unless explicitly disabled.
    const fn default_enabled() -> bool {
        true
    }

    /// Returns the default redistribution factor.
    const fn default_factor() -> f64 {
        constants::REDISTRIBUTION_FACTOR
    }

    /// Configuration with redistribution switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: constants::REDISTRIBUTION_FACTOR,
        }
    }
}

/// One queue of the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue name, unique within the simulation
    pub name: String,

    /// Static share weight
    pub weight: f64,

    /// Dispatch policy
    #[serde(default)]
    pub policy: Policy,

    /// Per-cycle allocation ceiling; the whole pool when absent
    #[serde(default)]
    pub cap: Option<f64>,

    /// Member processes in insertion order
    #[serde(default)]
    pub processes: Vec<ProcessConfig>,
}

impl QueueConfig {
    /// Creates an empty, uncapped queue.
    pub fn new(name: impl Into<String>, weight: f64, policy: Policy) -> Self {
        Self {
            name: name.into(),
            weight,
            policy,
            cap: None,
            processes: Vec::new(),
        }
    }

    /// Sets the cap, builder style.
    #[must_use]
    pub const fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Appends a process with the default priority, builder style.
    #[must_use]
    pub fn with_process(mut self, name: impl Into<String>, demand: f64) -> Self {
        self.processes.push(ProcessConfig::new(name, demand));
        self
    }

    /// Appends a fully specified process, builder style.
    #[must_use]
    pub fn with(mut self, process: ProcessConfig) -> Self {
        self.processes.push(process);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        finite(&format!("queues[{}].weight", self.name), self.weight)?;
        if self.weight <= 0.0 {
            return Err(ConfigError::NonPositiveWeight {
                queue: self.name.clone(),
                weight: self.weight,
            });
        }
        if let Some(cap) = self.cap {
            finite(&format!("queues[{}].cap", self.name), cap)?;
            if cap <= 0.0 {
                return Err(ConfigError::NonPositiveCap {
                    queue: self.name.clone(),
                    cap,
                });
            }
        }

        let mut names = HashSet::new();
        for process in &self.processes {
            if !names.insert(process.name.as_str()) {
                return Err(ConfigError::DuplicateProcess {
                    queue: self.name.clone(),
                    process: process.name.clone(),
                });
            }
            finite(
                &format!("queues[{}].processes[{}].demand", self.name, process.name),
                process.demand,
            )?;
            if process.demand < 0.0 {
                return Err(ConfigError::NegativeDemand {
                    queue: self.name.clone(),
                    process: process.name.clone(),
                    demand: process.demand,
                });
            }
        }
        Ok(())
    }
}

/// One process of a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Process name, unique within its queue
    pub name: String,

    /// Total units required
    pub demand: f64,

    /// Base priority, escalated by aging while unserved
    #[serde(default = "ProcessConfig::default_priority")]
    pub priority: u32,
}

impl ProcessConfig {
    /// Creates a process with the default priority.
    pub fn new(name: impl Into<String>, demand: f64) -> Self {
        Self {
            name: name.into(),
            demand,
            priority: defaults::PRIORITY,
        }
    }

    /// Sets the base priority, builder style.
    #[must_use]
    pub const fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the default base priority.
    const fn default_priority() -> u32 {
        defaults::PRIORITY
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field: field.to_owned(),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::NegativeParameter { field, value });
    }
    Ok(())
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::FactorOutOfRange { field, value });
    }
    Ok(())
}
