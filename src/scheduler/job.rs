use serde::{Deserialize, Serialize};

/// Remaining service time at or below this is treated as finished.
pub const COMPLETION_THRESHOLD: f64 = 0.05;

pub type JobId = u64;
pub type ServerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Waiting,
    Running,
    Completed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Waiting => write!(f, "waiting"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Job descriptor as produced by a workload source, before admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub category: String,
    pub priority: i64,
    pub total_service_time: f64,
}

impl JobSpec {
    pub fn new(category: impl Into<String>, priority: i64, total_service_time: f64) -> Self {
        Self {
            category: category.into(),
            priority,
            total_service_time,
        }
    }
}

/// A job flowing through intake, the shared queue and the workers.
///
/// All times are in simulated time units measured from simulation start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub category: String,
    pub priority: i64,
    pub status: JobStatus,
    pub total_service_time: f64,
    pub remaining_service_time: f64,
    pub arrival_time: f64,
    pub first_run_time: Option<f64>,
    pub completion_time: Option<f64>,
    /// Server currently responsible for the job. Zero until the orchestrator assigns one.
    pub owner: ServerId,
    pub turns: u32,
}

impl Job {
    pub fn admitted(id: JobId, spec: JobSpec, arrival_time: f64) -> Self {
        let total = spec.total_service_time.max(0.0);
        Self {
            id,
            category: spec.category,
            priority: spec.priority,
            status: JobStatus::Waiting,
            total_service_time: total,
            remaining_service_time: total,
            arrival_time,
            first_run_time: None,
            completion_time: None,
            owner: 0,
            turns: 0,
        }
    }

    /// True until the job's first turn begins.
    pub fn is_unstarted(&self) -> bool {
        self.first_run_time.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_service_time <= COMPLETION_THRESHOLD
    }

    /// Length of the next turn given the policy's quantum (if any).
    pub fn next_turn(&self, quantum: Option<f64>) -> f64 {
        match quantum {
            Some(q) => self.remaining_service_time.min(q),
            None => self.remaining_service_time,
        }
    }

    /// Record a finished turn of `length` time units.
    pub fn consume(&mut self, length: f64) {
        self.remaining_service_time = (self.remaining_service_time - length).max(0.0);
        self.turns += 1;
    }

    pub fn turnaround(&self) -> Option<f64> {
        self.completion_time.map(|done| done - self.arrival_time)
    }

    pub fn response(&self) -> Option<f64> {
        self.first_run_time.map(|first| first - self.arrival_time)
    }

    /// Turnaround minus service time, clamped at zero against timing jitter.
    pub fn waiting(&self) -> Option<f64> {
        self.turnaround()
            .map(|turnaround| (turnaround - self.total_service_time).max(0.0))
    }
}
