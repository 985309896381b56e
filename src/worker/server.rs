use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::scheduler::{ServerId, SharedQueue};
use crate::sink::{BusyStats, CompletionSink};
use crate::worker::executor::{JobExecutor, TurnOutcome, TurnResult};

/// One simulated server.
///
/// Claims the first queued job it owns, runs a turn outside the queue lock, then
/// either records the job as completed or puts it back at the tail of the queue
/// with the same owner.
pub struct Worker {
    id: ServerId,
    queue: Arc<SharedQueue>,
    completed: Arc<CompletionSink>,
    stats: Arc<BusyStats>,
    executor: JobExecutor,
    busy_time: f64,
    backoff: Duration,
}

impl Worker {
    pub fn new(
        id: ServerId,
        queue: Arc<SharedQueue>,
        completed: Arc<CompletionSink>,
        stats: Arc<BusyStats>,
        executor: JobExecutor,
        backoff: Duration,
    ) -> Self {
        Self {
            id,
            queue,
            completed,
            stats,
            executor,
            busy_time: 0.0,
            backoff,
        }
    }

    /// Time units spent executing turns so far.
    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    /// Claim and run a single turn. Returns `None` if no job is owned by this worker.
    pub async fn step(&mut self) -> Option<TurnResult> {
        let mut job = self.queue.claim(self.id).await?;

        let result = self.executor.execute(&mut job).await;
        self.busy_time += result.length;

        match result.outcome {
            TurnOutcome::Completed => {
                tracing::info!(
                    job_id = job.id,
                    server_id = self.id,
                    turns = job.turns,
                    "Job completed"
                );
                self.completed.push(job).await;
                self.stats.publish(self.id, self.busy_time).await;
            }
            TurnOutcome::Preempted => {
                tracing::debug!(
                    job_id = job.id,
                    server_id = self.id,
                    remaining = job.remaining_service_time,
                    "Quantum expired, job requeued"
                );
                self.queue.requeue(job).await;
            }
        }

        Some(result)
    }

    /// Run turns until cancelled. A turn in progress at cancellation is abandoned.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::debug!(server_id = self.id, "Worker started");

        loop {
            let stepped = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.step() => result.is_some(),
            };
            if stepped {
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.queue.changed() => {}
                _ = tokio::time::sleep(self.backoff) => {}
            }
        }

        tracing::debug!(server_id = self.id, busy_time = self.busy_time, "Worker stopped");
    }
}
