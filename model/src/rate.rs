use std::collections::VecDeque;

use geom::Duration;

/// Tracks roughly how often positions arrive, using the measured timestamps of the most recent
/// samples that made it into the trail.
#[derive(Clone, Debug)]
pub struct SamplingRateEstimator {
    window: usize,
    seed: Duration,
    // Measured timestamps in milliseconds, oldest first
    timestamps: VecDeque<i64>,
}

impl SamplingRateEstimator {
    pub fn new(window: usize, seed: Duration) -> Self {
        // Need at least two timestamps to measure anything
        let window = window.max(2);
        Self {
            window,
            seed,
            timestamps: VecDeque::with_capacity(window),
        }
    }

    pub fn record(&mut self, timestamp_ms: i64) {
        if self.timestamps.len() == self.window {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(timestamp_ms);
    }

    /// The mean interval between recorded timestamps, or the seed value until there are two of
    /// them.
    pub fn estimate(&self) -> Duration {
        match (self.timestamps.front(), self.timestamps.back()) {
            (Some(first), Some(last)) if self.timestamps.len() >= 2 => {
                // Untrusted timestamps; their span may not fit in an i64
                let span_ms = *last as f64 - *first as f64;
                let intervals = (self.timestamps.len() - 1) as f64;
                Duration::seconds((span_ms / intervals / 1000.0).max(0.0))
            }
            _ => self.seed,
        }
    }
}
