use serde::{Deserialize, Serialize};

use crate::scheduler::job::Job;

/// Scheduling policy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Policy {
    /// FIFO admission with quantum-bounded turns.
    #[default]
    RoundRobin,
    /// Shortest remaining service time first, non-preemptive.
    ShortestJobFirst,
    /// Lowest priority number first, non-preemptive.
    Priority,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::RoundRobin => write!(f, "RR"),
            Policy::ShortestJobFirst => write!(f, "SJF"),
            Policy::Priority => write!(f, "Priority"),
        }
    }
}

impl Policy {
    /// Parse a policy selector. Unknown selectors fall back to round-robin.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "rr" | "round-robin" | "roundrobin" => Policy::RoundRobin,
            "sjf" | "shortest-job-first" => Policy::ShortestJobFirst,
            "priority" | "prio" => Policy::Priority,
            other => {
                tracing::warn!(selector = other, "Unrecognized policy, falling back to RR");
                Policy::RoundRobin
            }
        }
    }

    /// Whether turns are bounded by the quantum.
    pub fn is_preemptive(&self) -> bool {
        matches!(self, Policy::RoundRobin)
    }

    /// Position at which `job` should be inserted into `buffer`.
    ///
    /// Keyed policies pick the first entry whose key is strictly greater than the
    /// new job's, so equal keys keep admission order.
    pub fn insertion_position(&self, buffer: &[Job], job: &Job) -> usize {
        let position = match self {
            Policy::RoundRobin => None,
            Policy::ShortestJobFirst => buffer
                .iter()
                .position(|queued| queued.remaining_service_time > job.remaining_service_time),
            Policy::Priority => buffer
                .iter()
                .position(|queued| queued.priority > job.priority),
        };
        position.unwrap_or(buffer.len())
    }
}
