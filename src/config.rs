use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::{Result, SimError};
use crate::scheduler::Policy;

/// Parameters for the synthetic job generator.
///
/// All durations are in simulated time units.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Labels drawn uniformly for each job. Descriptive only.
    pub categories: Vec<String>,
    /// Inclusive priority range (lower is more urgent).
    pub priority: RangeInclusive<i64>,
    /// Inclusive total service time range.
    pub service_time: RangeInclusive<f64>,
    /// Inclusive delay between consecutive submissions.
    pub inter_arrival: RangeInclusive<f64>,
    /// Fixed RNG seed for reproducible runs. Random when unset.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                "compute".to_string(),
                "io".to_string(),
                "memory".to_string(),
            ],
            priority: 1..=5,
            service_time: 1.0..=8.0,
            inter_arrival: 0.2..=1.5,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(SimError::InvalidConfig(
                "generator needs at least one category".to_string(),
            ));
        }
        if self.priority.is_empty() {
            return Err(SimError::InvalidConfig(format!(
                "empty priority range {:?}",
                self.priority
            )));
        }
        if self.service_time.is_empty()
            || *self.service_time.start() <= 0.0
            || !self.service_time.end().is_finite()
        {
            return Err(SimError::InvalidConfig(format!(
                "service time range must be positive, finite and non-empty, got {:?}",
                self.service_time
            )));
        }
        if self.inter_arrival.is_empty()
            || *self.inter_arrival.start() < 0.0
            || !self.inter_arrival.end().is_finite()
        {
            return Err(SimError::InvalidConfig(format!(
                "inter-arrival range must be non-negative, finite and non-empty, got {:?}",
                self.inter_arrival
            )));
        }
        Ok(())
    }
}

/// Where jobs come from during a run.
#[derive(Debug, Clone)]
pub enum Workload {
    /// Randomized jobs at randomized intervals.
    Generated(GeneratorConfig),
    /// A fixed list submitted back to back, in order.
    Scripted(Vec<crate::scheduler::JobSpec>),
}

impl Default for Workload {
    fn default() -> Self {
        Workload::Generated(GeneratorConfig::default())
    }
}

/// Configuration of a simulation run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulated servers; ids run from 1 to `server_count`.
    pub server_count: u64,
    pub policy: Policy,
    /// Maximum turn length in time units. Only consulted under round-robin.
    pub quantum: f64,
    /// The run ends once this many jobs have completed.
    pub target_jobs: usize,
    /// Wall duration of one simulated time unit.
    pub time_unit: Duration,
    /// Orchestrator pause between admission/rebalance passes when intake is idle.
    pub orchestrator_backoff: Duration,
    /// Worker pause before re-scanning the queue when it found nothing to claim.
    pub worker_backoff: Duration,
    pub workload: Workload,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            server_count: 3,
            policy: Policy::RoundRobin,
            quantum: 2.0,
            target_jobs: 20,
            time_unit: Duration::from_millis(100),
            orchestrator_backoff: Duration::from_millis(50),
            worker_backoff: Duration::from_millis(100),
            workload: Workload::default(),
        }
    }
}

impl SimConfig {
    pub fn new(server_count: u64, policy: Policy, quantum: f64, target_jobs: usize) -> Self {
        Self {
            server_count,
            policy,
            quantum,
            target_jobs,
            ..Default::default()
        }
    }

    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }

    /// Submit exactly these jobs, and stop once all of them complete.
    pub fn with_script(mut self, jobs: Vec<crate::scheduler::JobSpec>) -> Self {
        self.target_jobs = jobs.len();
        self.workload = Workload::Scripted(jobs);
        self
    }

    /// Quantum to apply to each turn, `None` for run-to-completion policies.
    pub fn effective_quantum(&self) -> Option<f64> {
        self.policy.is_preemptive().then_some(self.quantum)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_count == 0 {
            return Err(SimError::InvalidConfig(
                "server count must be at least 1".to_string(),
            ));
        }
        if self.quantum.is_nan() || self.quantum <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "quantum must be positive, got {}",
                self.quantum
            )));
        }
        if self.target_jobs == 0 {
            return Err(SimError::InvalidConfig(
                "target job count must be at least 1".to_string(),
            ));
        }
        if self.time_unit.is_zero() {
            return Err(SimError::InvalidConfig(
                "time unit must be non-zero".to_string(),
            ));
        }
        if self.orchestrator_backoff.is_zero() || self.worker_backoff.is_zero() {
            return Err(SimError::InvalidConfig(
                "backoff intervals must be non-zero".to_string(),
            ));
        }
        match &self.workload {
            Workload::Generated(generator) => generator.validate(),
            Workload::Scripted(jobs) => {
                if jobs.len() < self.target_jobs {
                    return Err(SimError::InvalidConfig(format!(
                        "script has {} jobs but target is {}",
                        jobs.len(),
                        self.target_jobs
                    )));
                }
                if let Some(bad) = jobs
                    .iter()
                    .find(|j| !j.total_service_time.is_finite() || j.total_service_time <= 0.0)
                {
                    return Err(SimError::InvalidConfig(format!(
                        "scripted job service time must be positive and finite, got {}",
                        bad.total_service_time
                    )));
                }
                Ok(())
            }
        }
    }
}
