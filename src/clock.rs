use std::time::Duration;

use tokio::time::Instant;

/// Converts between simulated time units and wall time.
///
/// Timestamps are time units elapsed since the clock was created. Uses the tokio
/// clock so paused test runtimes see exact values.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    start: Instant,
    unit: Duration,
}

impl SimClock {
    pub fn new(unit: Duration) -> Self {
        Self {
            start: Instant::now(),
            unit,
        }
    }

    /// Time units elapsed since the clock started.
    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64() / self.unit.as_secs_f64()
    }

    /// Wall duration of `units` time units. Negative or NaN input yields zero;
    /// values past `Duration::MAX` saturate.
    pub fn to_duration(&self, units: f64) -> Duration {
        let secs = self.unit.as_secs_f64() * units.max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Sleep for `units` time units.
    pub async fn sleep_units(&self, units: f64) {
        tokio::time::sleep(self.to_duration(units)).await;
    }
}
