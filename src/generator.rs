use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;

use crate::clock::SimClock;
use crate::config::GeneratorConfig;
use crate::scheduler::{IntakeHandle, JobSpec};

/// Produces randomized job descriptors at randomized intervals.
pub struct JobGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl JobGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    pub fn next_spec(&mut self) -> JobSpec {
        let category = self
            .config
            .categories
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let priority = self.rng.random_range(self.config.priority.clone());
        let service_time = self.rng.random_range(self.config.service_time.clone());
        JobSpec::new(category, priority, service_time)
    }

    /// Delay before the next submission, in time units.
    pub fn next_delay(&mut self) -> f64 {
        self.rng.random_range(self.config.inter_arrival.clone())
    }

    /// Submit `count` jobs, sleeping a random delay before each one.
    ///
    /// Stops early if cancelled or if the intake is gone.
    pub async fn run(
        mut self,
        intake: IntakeHandle,
        clock: SimClock,
        count: usize,
        cancel: CancellationToken,
    ) {
        for _ in 0..count {
            let delay = self.next_delay();
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = clock.sleep_units(delay) => {}
            }

            let spec = self.next_spec();
            if let Err(e) = intake.submit(spec) {
                tracing::warn!(error = %e, "Generator stopping");
                return;
            }
        }
        tracing::debug!(count, "Generator finished");
    }
}

/// Submit a fixed list of jobs back to back, in order.
pub fn submit_script(intake: &IntakeHandle, jobs: Vec<JobSpec>) -> crate::error::Result<()> {
    for spec in jobs {
        intake.submit(spec)?;
    }
    Ok(())
}
