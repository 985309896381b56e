use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::clock::SimClock;
use crate::error::{Result, SimError};
use crate::scheduler::job::{Job, JobId, JobSpec};

/// Submission side of the intake queue.
///
/// Stamps each descriptor with the next job id and its arrival time before
/// handing it to the orchestrator. Clones share the id sequence.
#[derive(Debug, Clone)]
pub struct IntakeHandle {
    tx: mpsc::UnboundedSender<Job>,
    next_id: Arc<AtomicU64>,
    clock: SimClock,
}

/// Create a connected intake handle and its single consumer.
pub fn intake(clock: SimClock) -> (IntakeHandle, mpsc::UnboundedReceiver<Job>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = IntakeHandle {
        tx,
        next_id: Arc::new(AtomicU64::new(1)),
        clock,
    };
    (handle, rx)
}

impl IntakeHandle {
    pub fn submit(&self, spec: JobSpec) -> Result<JobId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = Job::admitted(id, spec, self.clock.now());
        self.tx.send(job).map_err(|_| SimError::IntakeClosed(id))?;
        tracing::debug!(job_id = id, "Job submitted to intake");
        Ok(id)
    }
}
