use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::SimConfig;
use crate::scheduler::assigner::OwnerAssigner;
use crate::scheduler::job::{Job, JobId, ServerId};
use crate::scheduler::policy::Policy;
use crate::scheduler::queue::{Migration, SharedQueue};

/// Where an admitted job landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub job_id: JobId,
    pub owner: ServerId,
    pub position: usize,
}

/// Sole consumer of the intake. Assigns owners, orders jobs into the shared
/// queue and evens out per-server waiting load.
pub struct Orchestrator {
    policy: Policy,
    assigner: OwnerAssigner,
    intake: mpsc::UnboundedReceiver<Job>,
    queue: Arc<SharedQueue>,
    backoff: Duration,
}

impl Orchestrator {
    pub fn new(
        config: &SimConfig,
        intake: mpsc::UnboundedReceiver<Job>,
        queue: Arc<SharedQueue>,
    ) -> Self {
        Self {
            policy: config.policy,
            assigner: OwnerAssigner::new(config.server_count),
            intake,
            queue,
            backoff: config.orchestrator_backoff,
        }
    }

    pub fn assign_owner(&self) -> ServerId {
        self.assigner.assign_owner()
    }

    /// Admit the oldest job waiting in intake, if any.
    pub async fn admit_one(&mut self) -> Option<Admission> {
        let job = self.intake.try_recv().ok()?;
        Some(self.admit(job).await)
    }

    async fn admit(&self, mut job: Job) -> Admission {
        job.owner = self.assign_owner();
        let (job_id, owner) = (job.id, job.owner);
        let position = self.queue.insert_ordered(job, self.policy).await;
        tracing::info!(job_id, owner, position, "Job admitted");
        Admission {
            job_id,
            owner,
            position,
        }
    }

    /// Migrate at most one waiting job from the busiest to the idlest server.
    pub async fn rebalance(&self) -> Option<Migration> {
        let migration = self.queue.rebalance(self.assigner.server_count()).await;
        if let Some(m) = migration {
            tracing::info!(job_id = m.job_id, from = m.from, to = m.to, "Job migrated");
        }
        migration
    }

    /// Admission and rebalancing loop.
    ///
    /// Wakes as soon as a job lands in intake; otherwise ticks on the backoff so
    /// rebalancing keeps running. Once intake closes only the tick remains.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(policy = %self.policy, "Orchestrator started");
        let mut tick = tokio::time::interval(self.backoff);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut intake_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = self.intake.recv(), if intake_open => match received {
                    Some(job) => {
                        self.admit(job).await;
                    }
                    None => {
                        tracing::debug!("Intake closed");
                        intake_open = false;
                    }
                },
                _ = tick.tick() => {}
            }

            self.rebalance().await;
        }

        tracing::debug!("Orchestrator stopped");
    }
}
