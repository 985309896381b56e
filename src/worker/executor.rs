use crate::clock::SimClock;
use crate::scheduler::{Job, JobId, JobStatus};

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Remaining work fell to the completion threshold.
    Completed,
    /// The quantum ran out with work left; the job goes back to the queue.
    Preempted,
}

/// Outcome of one execution turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnResult {
    pub job_id: JobId,
    /// Time units the turn lasted.
    pub length: f64,
    pub outcome: TurnOutcome,
    pub remaining: f64,
}

/// Runs simulated compute turns.
///
/// A turn is a timed sleep of `min(remaining, quantum)` time units, or the whole
/// remaining time when no quantum applies.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    clock: SimClock,
    quantum: Option<f64>,
}

impl JobExecutor {
    pub fn new(clock: SimClock, quantum: Option<f64>) -> Self {
        Self { clock, quantum }
    }

    /// Execute one turn of `job`, updating its timing fields in place.
    pub async fn execute(&self, job: &mut Job) -> TurnResult {
        if job.first_run_time.is_none() {
            job.first_run_time = Some(self.clock.now());
        }

        let length = job.next_turn(self.quantum);
        tracing::debug!(job_id = job.id, owner = job.owner, length, "Turn started");

        self.clock.sleep_units(length).await;
        job.consume(length);

        let outcome = if job.is_finished() {
            job.status = JobStatus::Completed;
            job.completion_time = Some(self.clock.now());
            TurnOutcome::Completed
        } else {
            job.status = JobStatus::Waiting;
            TurnOutcome::Preempted
        };

        TurnResult {
            job_id: job.id,
            length,
            outcome,
            remaining: job.remaining_service_time,
        }
    }
}
