use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::clock::SimClock;
use crate::config::{SimConfig, Workload};
use crate::error::{Result, SimError};
use crate::generator::{submit_script, JobGenerator};
use crate::scheduler::{intake, Job, Orchestrator, ServerId, SharedQueue};
use crate::sink::{BusyStats, CompletionSink};
use crate::worker::{JobExecutor, Worker};

/// Everything a finished run hands to reporting.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub completed: Vec<Job>,
    pub busy: BTreeMap<ServerId, f64>,
    /// Time units from start until the target count completed.
    pub elapsed: f64,
}

/// Wires up and runs one simulation.
pub struct Simulation {
    pub config: SimConfig,
    pub queue: Arc<SharedQueue>,
    pub completed: Arc<CompletionSink>,
    pub stats: Arc<BusyStats>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            queue: Arc::new(SharedQueue::new()),
            completed: Arc::new(CompletionSink::new()),
            stats: Arc::new(BusyStats::new()),
        })
    }

    /// Run until the target number of jobs has completed.
    ///
    /// Starts, in order:
    /// 1. The orchestrator (sole intake consumer)
    /// 2. One worker per configured server
    /// 3. The workload: generator task, or the scripted jobs submitted up front
    ///
    /// Then waits for the completion count to reach the target and cancels every
    /// task. Jobs still queued or mid-turn at that point are dropped. A task that
    /// panics ends the run with [`SimError::TaskFailed`].
    ///
    /// `shutdown` lets the caller stop early; the outcome then holds whatever
    /// completed so far.
    pub async fn run(self, shutdown: CancellationToken) -> Result<SimulationOutcome> {
        let clock = SimClock::new(self.config.time_unit);
        let cancel = shutdown.child_token();
        let (intake_handle, intake_rx) = intake(clock);
        let mut tasks = JoinSet::new();

        tracing::info!(
            servers = self.config.server_count,
            policy = %self.config.policy,
            quantum = self.config.quantum,
            target_jobs = self.config.target_jobs,
            "Starting simulation"
        );

        let orchestrator = Orchestrator::new(&self.config, intake_rx, self.queue.clone());
        tasks.spawn(orchestrator.run(cancel.clone()));

        let executor = JobExecutor::new(clock, self.config.effective_quantum());
        for server_id in 1..=self.config.server_count {
            let worker = Worker::new(
                server_id,
                self.queue.clone(),
                self.completed.clone(),
                self.stats.clone(),
                executor.clone(),
                self.config.worker_backoff,
            );
            tasks.spawn(worker.run(cancel.clone()));
        }

        match self.config.workload.clone() {
            Workload::Generated(generator_config) => {
                let generator = JobGenerator::new(generator_config);
                tasks.spawn(generator.run(
                    intake_handle,
                    clock,
                    self.config.target_jobs,
                    cancel.clone(),
                ));
            }
            Workload::Scripted(jobs) => submit_script(&intake_handle, jobs)?,
        }

        let completions = self.completed.subscribe();
        let supervised =
            supervise(&mut tasks, completions, self.config.target_jobs, &shutdown).await;
        let elapsed = clock.now();

        cancel.cancel();
        if let Err(e) = supervised {
            tasks.shutdown().await;
            return Err(e);
        }
        while let Some(joined) = tasks.join_next().await {
            joined?;
        }

        let completed = self.completed.snapshot().await;
        let busy = self.stats.snapshot().await;
        tracing::info!(completed = completed.len(), elapsed, "Simulation finished");

        Ok(SimulationOutcome {
            completed,
            busy,
            elapsed,
        })
    }
}

/// Wait until `target` jobs have completed or `shutdown` fires.
///
/// Tasks that return normally are reaped and waiting continues; the first
/// task to panic or be aborted fails the wait.
async fn supervise(
    tasks: &mut JoinSet<()>,
    mut completions: watch::Receiver<usize>,
    target: usize,
    shutdown: &CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            reached = completions.wait_for(|count| *count >= target) => {
                reached.map_err(|_| SimError::Internal("completion sink closed".to_string()))?;
                return Ok(());
            }
            _ = shutdown.cancelled() => {
                tracing::warn!("Simulation interrupted before reaching target");
                return Ok(());
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Simulation task failed");
                    return Err(e.into());
                }
            }
        }
    }
}
