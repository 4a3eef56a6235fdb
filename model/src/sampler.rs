use std::collections::BTreeMap;

use geom::{Duration, Pt2D, Time};

use crate::host::{MapHost, Projection};
use crate::rotation;
use crate::{
    PositionLog, PositionRecord, Sample, SampleTrail, SamplingRateEstimator, TracerConfig,
    TrailPoint,
};

/// Remembers which render time each folded record got.
#[derive(Clone, Debug, Default)]
pub struct FoldedMarker {
    by_timestamp: BTreeMap<i64, Time>,
    // (render time, index into the PositionLog), sorted by render time
    timeline: Vec<(Time, usize)>,
}

impl FoldedMarker {
    fn insert(&mut self, timestamp_ms: i64, log_idx: usize, render_time: Time) {
        self.by_timestamp.insert(timestamp_ms, render_time);
        self.timeline.push((render_time, log_idx));
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn render_time_of(&self, timestamp_ms: i64) -> Option<Time> {
        self.by_timestamp.get(&timestamp_ms).cloned()
    }

    /// The PositionLog index of the folded record with the greatest render time <= `time`
    pub fn latest_at_or_before(&self, time: Time) -> Option<usize> {
        let n = self.timeline.partition_point(|(t, _)| *t <= time);
        if n == 0 {
            return None;
        }
        Some(self.timeline[n - 1].1)
    }
}

/// What one frame drew
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub sample_time: Time,
    pub sample: Sample,
    pub pos: Pt2D,
    pub extended_preview: bool,
}

/// Runs once per display refresh, turning the irregular PositionLog into a smoothly moving
/// marker. Safe to call any number of times between location updates.
pub struct RenderSampler {
    lag_factor: f64,
    trail: SampleTrail,
    folded: FoldedMarker,
    rate: SamplingRateEstimator,
    // Records before this index in the PositionLog have already been folded (or skipped)
    next_record: usize,
    last_sample_time: Option<Time>,
    preview: Vec<Pt2D>,
}

impl RenderSampler {
    pub fn new(config: &TracerConfig) -> Self {
        Self {
            lag_factor: config.lag_factor,
            trail: SampleTrail::new(),
            folded: FoldedMarker::default(),
            rate: SamplingRateEstimator::new(config.rate_window, config.seed_interval),
            next_record: 0,
            last_sample_time: None,
            preview: Vec::new(),
        }
    }

    pub fn trail(&self) -> &SampleTrail {
        &self.trail
    }

    pub fn folded(&self) -> &FoldedMarker {
        &self.folded
    }

    pub fn preview(&self) -> &[Pt2D] {
        &self.preview
    }

    pub fn estimated_interval(&self) -> Duration {
        self.rate.estimate()
    }

    /// None if nothing was drawn this frame.
    pub fn frame(&mut self, log: &PositionLog, now: Time, host: &mut dyn MapHost) -> Option<Frame> {
        if log.is_empty() {
            return None;
        }
        if log.len() > self.next_record {
            self.fold(log, now);
        }

        let lag = self.rate.estimate() * self.lag_factor;
        let mut sample_time = if lag < now - Time::START_OF_DAY {
            now - lag
        } else {
            Time::START_OF_DAY
        };
        if let Some(last) = self.last_sample_time {
            if last > sample_time {
                sample_time = last;
            }
        }
        self.last_sample_time = Some(sample_time);

        let sample = match self.trail.sample_at(sample_time, true) {
            Some(x) => x,
            None => {
                host.hide_marker();
                return None;
            }
        };
        let pos = host.project(sample.to_lon_lat());
        host.show_marker(pos, sample.rotation);

        let extended_preview = match self
            .folded
            .latest_at_or_before(sample_time)
            .and_then(|idx| log.get(idx))
        {
            Some(rec) => !rec.omit,
            None => false,
        };
        if extended_preview {
            self.preview.push(pos);
            host.extend_preview(pos);
        }

        host.request_redraw();

        Some(Frame {
            sample_time,
            sample,
            pos,
            extended_preview,
        })
    }

    // Give every record that arrived since the last fold a render time, spacing them evenly
    // between the end of the trail and now.
    fn fold(&mut self, log: &PositionLog, now: Time) {
        let mut fresh: Vec<(usize, &PositionRecord)> = Vec::new();
        for idx in self.next_record..log.len() {
            let rec = match log.get(idx) {
                Some(rec) => rec,
                None => continue,
            };
            if rec.lon_lat().is_none() {
                warn!(
                    "Skipping position at {}: ({}, {}) isn't usable",
                    rec.timestamp_ms, rec.latitude, rec.longitude
                );
                continue;
            }
            fresh.push((idx, rec));
        }
        self.next_record = log.len();
        if fresh.is_empty() {
            return;
        }

        let n = fresh.len() as f64;
        let (start_time, stride) = match self.trail.last() {
            Some(last) if now > last.render_time => {
                (last.render_time, (now - last.render_time) / n)
            }
            Some(last) => (last.render_time, Duration::ZERO),
            None => {
                // Nothing to continue from, so spread any backlog over the assumed interval,
                // with the newest landing at now. The display clock has nothing before its start.
                let stride = self.rate.estimate();
                let backlog = stride * n;
                if backlog < now - Time::START_OF_DAY {
                    (now - backlog, stride)
                } else {
                    (Time::START_OF_DAY, (now - Time::START_OF_DAY) / n)
                }
            }
        };

        let keep = self.trail.len().saturating_sub(1);
        let mut replacement: Vec<TrailPoint> = self.trail.last().into_iter().cloned().collect();
        let mut prev_rotation = self.trail.last().map(|pt| pt.rotation);
        let mut marks = Vec::new();
        for (i, (idx, rec)) in fresh.into_iter().enumerate() {
            let render_time = start_time + stride * (i + 1) as f64;
            let rotation = rotation::resolve(prev_rotation, rec.heading);
            prev_rotation = Some(rotation);
            replacement.push(TrailPoint {
                longitude: rec.longitude,
                latitude: rec.latitude,
                rotation,
                render_time,
            });
            marks.push((rec.timestamp_ms, idx, render_time));
        }

        if let Err(err) = self.trail.replace_suffix(keep, replacement) {
            warn!("Couldn't fold {} new positions: {}", marks.len(), err);
            return;
        }
        debug!(
            "Folded {} positions, stride {}, trail now has {} points",
            marks.len(),
            stride,
            self.trail.len()
        );
        for (timestamp_ms, idx, render_time) in marks {
            self.folded.insert(timestamp_ms, idx, render_time);
            self.rate.record(timestamp_ms);
        }
    }
}
