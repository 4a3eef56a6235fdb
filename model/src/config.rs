use geom::Duration;
use serde::{Deserialize, Serialize};

/// Tuning for how the marker trails behind live positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// How many recent positions to average the arrival interval over
    pub rate_window: usize,
    /// The assumed interval between positions before there's enough data to measure it
    pub seed_interval: Duration,
    /// The marker is drawn this many estimated intervals in the past, so that the next position
    /// has usually arrived before the marker needs it.
    pub lag_factor: f64,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            rate_window: 20,
            seed_interval: Duration::seconds(0.5),
            lag_factor: 1.5,
        }
    }
}
