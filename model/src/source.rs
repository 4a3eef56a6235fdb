use std::collections::VecDeque;

use anyhow::Result;
use chrono::NaiveDateTime;
use geom::{Duration, GPSBounds, LonLat, Time};
use serde::Deserialize;

/// A raw reading from whatever senses location
#[derive(Clone, Debug, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Option<f64>,
    pub timestamp_ms: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LocationEvent {
    Fix(LocationFix),
    /// The source had a problem. There's just no new data this time.
    Failure(String),
    /// No more fixes will come
    Stop,
}

pub trait LocationSource {
    /// The next event due at or before `now`, if any. Call repeatedly to drain everything due.
    fn poll(&mut self, now: Time) -> Option<LocationEvent>;
}

/// Plays back a recording, releasing each fix once as much time has passed since the start of the
/// clock as separated it from the first one.
pub struct ReplaySource {
    // (offset from the first fix, fix)
    pending: VecDeque<(Duration, LocationFix)>,
    gps_bounds: GPSBounds,
    stopped: bool,
}

impl ReplaySource {
    pub fn new(fixes: Vec<LocationFix>) -> Self {
        let mut gps_bounds = GPSBounds::new();
        let start = fixes.first().map(|fix| fix.timestamp_ms).unwrap_or(0);
        let mut pending = VecDeque::new();
        for fix in fixes {
            if fix.latitude.is_finite() && fix.longitude.is_finite() {
                // Pad, so even a recording that never moves has some area
                for (dx, dy) in [(-0.001, -0.001), (0.001, 0.001)] {
                    gps_bounds.update(LonLat::new(fix.longitude + dx, fix.latitude + dy));
                }
            }
            let offset_ms = fix.timestamp_ms as f64 - start as f64;
            pending.push_back((Duration::seconds(offset_ms / 1000.0), fix));
        }
        Self {
            pending,
            gps_bounds,
            stopped: false,
        }
    }

    /// Reads a CSV with `time`, `latitude`, `longitude`, and optionally `heading` columns. Rows
    /// must already be in time order.
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut fixes = Vec::new();
        for rec in csv::Reader::from_reader(reader).deserialize() {
            let rec: Row = rec?;
            let datetime = NaiveDateTime::parse_from_str(&rec.time, "%Y-%m-%d %H:%M:%S%.f")?;
            let timestamp_ms = datetime.and_utc().timestamp_millis();
            if let Some(prev) = fixes.last().map(|fix: &LocationFix| fix.timestamp_ms) {
                if timestamp_ms < prev {
                    bail!("Replay input out-of-order: {} is before the previous row", rec.time);
                }
            }
            fixes.push(LocationFix {
                latitude: rec.latitude,
                longitude: rec.longitude,
                heading: rec.heading,
                timestamp_ms,
            });
        }
        if fixes.is_empty() {
            bail!("Replay input has no positions");
        }
        Ok(Self::new(fixes))
    }

    /// Covers every fix in the recording
    pub fn gps_bounds(&self) -> &GPSBounds {
        &self.gps_bounds
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// When the last fix will be released, relative to the start of the replay
    pub fn duration(&self) -> Duration {
        self.pending
            .back()
            .map(|(offset, _)| *offset)
            .unwrap_or(Duration::ZERO)
    }
}

impl LocationSource for ReplaySource {
    fn poll(&mut self, now: Time) -> Option<LocationEvent> {
        if self.stopped {
            return None;
        }
        let due = match self.pending.front() {
            Some((offset, _)) => *offset <= now - Time::START_OF_DAY,
            None => {
                self.stopped = true;
                return Some(LocationEvent::Stop);
            }
        };
        if !due {
            return None;
        }
        self.pending.pop_front().map(|(_, fix)| LocationEvent::Fix(fix))
    }
}

#[derive(Deserialize)]
struct Row {
    time: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    heading: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: f64) -> Time {
        Time::START_OF_DAY + Duration::seconds(ms / 1000.0)
    }

    const CSV: &str = "time,latitude,longitude,heading
2022-03-01 08:00:00.000,10.0,20.0,0
2022-03-01 08:00:00.500,10.001,20.0,90
2022-03-01 08:00:01.250,10.002,20.0,
";

    #[test]
    fn load_csv() {
        let mut source = ReplaySource::load(CSV.as_bytes()).unwrap();
        assert_eq!(source.remaining(), 3);
        assert_eq!(source.duration(), Duration::seconds(1.25));

        let first = match source.poll(t(0.0)) {
            Some(LocationEvent::Fix(fix)) => fix,
            x => panic!("expected a fix, got {:?}", x),
        };
        assert_eq!(first.heading, Some(0.0));
        assert!(source.poll(t(0.0)).is_none());
        assert!(source.poll(t(499.0)).is_none());
        assert!(matches!(source.poll(t(500.0)), Some(LocationEvent::Fix(_))));

        let last = match source.poll(t(5000.0)) {
            Some(LocationEvent::Fix(fix)) => fix,
            x => panic!("expected a fix, got {:?}", x),
        };
        assert_eq!(last.heading, None);
        assert_eq!(last.timestamp_ms - first.timestamp_ms, 1250);

        assert_eq!(source.poll(t(5000.0)), Some(LocationEvent::Stop));
        assert_eq!(source.poll(t(6000.0)), None);
    }

    #[test]
    fn reject_bad_input() {
        let backwards = "time,latitude,longitude
2022-03-01 08:00:01,10.0,20.0
2022-03-01 08:00:00,10.0,20.0
";
        assert!(ReplaySource::load(backwards.as_bytes()).is_err());
        assert!(ReplaySource::load("time,latitude,longitude\n".as_bytes()).is_err());
        assert!(ReplaySource::load("time,latitude,longitude\nyesterday,1,2\n".as_bytes()).is_err());
    }
}
