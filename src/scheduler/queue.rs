use std::collections::BTreeMap;

use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::scheduler::job::{Job, JobId, JobStatus, ServerId};
use crate::scheduler::policy::Policy;

/// A waiting job re-tagged from one server to another by rebalancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub job_id: JobId,
    pub from: ServerId,
    pub to: ServerId,
}

/// Ordered sequence of admitted jobs that are not currently running.
///
/// Order is fixed at insertion time: rebalancing only changes owners, and
/// requeued jobs rejoin at the tail.
#[derive(Debug, Default)]
pub struct WorkQueue {
    jobs: Vec<Job>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job at the position chosen by `policy`. Returns that position.
    pub fn insert_ordered(&mut self, job: Job, policy: Policy) -> usize {
        let position = policy.insertion_position(&self.jobs, &job);
        self.jobs.insert(position, job);
        position
    }

    /// Append a job at the tail without consulting any policy.
    pub fn requeue(&mut self, mut job: Job) {
        job.status = JobStatus::Waiting;
        self.jobs.push(job);
    }

    /// Remove and return the first job owned by `server_id`.
    pub fn claim(&mut self, server_id: ServerId) -> Option<Job> {
        let index = self.jobs.iter().position(|j| j.owner == server_id)?;
        let mut job = self.jobs.remove(index);
        job.status = JobStatus::Running;
        Some(job)
    }

    /// Count of unstarted jobs per server, for servers `1..=server_count`.
    pub fn waiting_load(&self, server_count: u64) -> BTreeMap<ServerId, usize> {
        let mut load: BTreeMap<ServerId, usize> = (1..=server_count).map(|id| (id, 0)).collect();
        for job in self.jobs.iter().filter(|j| j.is_unstarted()) {
            if let Some(count) = load.get_mut(&job.owner) {
                *count += 1;
            }
        }
        load
    }

    /// Move at most one unstarted job from the most to the least loaded server
    /// when their loads differ by more than one. Ties pick the lowest server id.
    pub fn rebalance(&mut self, server_count: u64) -> Option<Migration> {
        let load = self.waiting_load(server_count);
        let (&from, &max_load) = load
            .iter()
            .reduce(|best, entry| if entry.1 > best.1 { entry } else { best })?;
        let (&to, &min_load) = load
            .iter()
            .reduce(|best, entry| if entry.1 < best.1 { entry } else { best })?;

        if max_load - min_load <= 1 {
            return None;
        }

        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.owner == from && j.is_unstarted())?;
        job.owner = to;
        Some(Migration {
            job_id: job.id,
            from,
            to,
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// The work queue behind its lock, plus a signal raised whenever a job is added.
#[derive(Debug, Default)]
pub struct SharedQueue {
    inner: Mutex<WorkQueue>,
    available: Notify,
}

impl SharedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to the queue. Do not hold across simulated compute.
    pub async fn lock(&self) -> MutexGuard<'_, WorkQueue> {
        self.inner.lock().await
    }

    pub async fn insert_ordered(&self, job: Job, policy: Policy) -> usize {
        let position = self.inner.lock().await.insert_ordered(job, policy);
        self.available.notify_waiters();
        position
    }

    pub async fn requeue(&self, job: Job) {
        self.inner.lock().await.requeue(job);
        self.available.notify_waiters();
    }

    pub async fn claim(&self, server_id: ServerId) -> Option<Job> {
        self.inner.lock().await.claim(server_id)
    }

    pub async fn rebalance(&self, server_count: u64) -> Option<Migration> {
        let migration = self.inner.lock().await.rebalance(server_count);
        if migration.is_some() {
            self.available.notify_waiters();
        }
        migration
    }

    /// Resolves on the next insertion, requeue or migration.
    pub async fn changed(&self) {
        self.available.notified().await;
    }

    /// Copy of the current queue contents, in order.
    pub async fn snapshot(&self) -> Vec<Job> {
        self.inner.lock().await.jobs().to_vec()
    }
}
