//! Scheduling metrics over a finished run.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Throughput | completed jobs / elapsed time |
//! | Turnaround | completion - arrival |
//! | Response | first run - arrival |
//! | Waiting | max(turnaround - service time, 0) |
//! | Utilization | 100 * total busy / (servers * elapsed) |
//!
//! All times are simulated time units.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scheduler::{Job, Policy, ServerId};
use crate::simulation::SimulationOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub policy: Policy,
    pub server_count: u64,
    pub completed: usize,
    pub elapsed: f64,
    /// Jobs per time unit.
    pub throughput: f64,
    pub mean_turnaround: f64,
    pub mean_response: f64,
    pub mean_waiting: f64,
    pub max_waiting: f64,
    pub utilization_percent: f64,
    pub busy_by_server: BTreeMap<ServerId, f64>,
}

impl Report {
    pub fn compute(outcome: &SimulationOutcome, policy: Policy, server_count: u64) -> Self {
        let jobs = &outcome.completed;
        let elapsed = outcome.elapsed;

        let mut busy_by_server: BTreeMap<ServerId, f64> =
            (1..=server_count).map(|id| (id, 0.0)).collect();
        busy_by_server.extend(outcome.busy.iter().map(|(&id, &busy)| (id, busy)));
        let total_busy: f64 = busy_by_server.values().sum();

        let throughput = if elapsed > 0.0 {
            jobs.len() as f64 / elapsed
        } else {
            0.0
        };
        let capacity = server_count as f64 * elapsed;
        let utilization_percent = if capacity > 0.0 {
            100.0 * total_busy / capacity
        } else {
            0.0
        };

        Self {
            generated_at: Utc::now(),
            policy,
            server_count,
            completed: jobs.len(),
            elapsed,
            throughput,
            mean_turnaround: mean(jobs.iter().filter_map(Job::turnaround)),
            mean_response: mean(jobs.iter().filter_map(Job::response)),
            mean_waiting: mean(jobs.iter().filter_map(Job::waiting)),
            max_waiting: jobs
                .iter()
                .filter_map(Job::waiting)
                .fold(0.0, f64::max),
            utilization_percent,
            busy_by_server,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
