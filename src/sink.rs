use std::collections::BTreeMap;

use tokio::sync::{watch, Mutex};

use crate::scheduler::job::{Job, ServerId};

/// Append-only record of finished jobs.
///
/// Publishes the running completion count so the simulation can wait for its target.
#[derive(Debug)]
pub struct CompletionSink {
    jobs: Mutex<Vec<Job>>,
    count_tx: watch::Sender<usize>,
}

impl Default for CompletionSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionSink {
    pub fn new() -> Self {
        let (count_tx, _) = watch::channel(0);
        Self {
            jobs: Mutex::new(Vec::new()),
            count_tx,
        }
    }

    pub async fn push(&self, job: Job) {
        let mut jobs = self.jobs.lock().await;
        jobs.push(job);
        self.count_tx.send_replace(jobs.len());
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count_tx.subscribe()
    }
}

/// Cumulative busy time per server, in time units.
#[derive(Debug, Default)]
pub struct BusyStats {
    busy: Mutex<BTreeMap<ServerId, f64>>,
}

impl BusyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest cumulative busy time reported by a server.
    pub async fn publish(&self, server_id: ServerId, busy_time: f64) {
        self.busy.lock().await.insert(server_id, busy_time);
    }

    pub async fn get(&self, server_id: ServerId) -> Option<f64> {
        self.busy.lock().await.get(&server_id).copied()
    }

    pub async fn snapshot(&self) -> BTreeMap<ServerId, f64> {
        self.busy.lock().await.clone()
    }
}
