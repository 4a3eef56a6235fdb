use anyhow::Result;
use geom::{LonLat, Time};

/// One point of the smoothed trail. `render_time` is on the display's own clock, assigned when the
/// point was folded in. It's unrelated to when the position was measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub longitude: f64,
    pub latitude: f64,
    /// Radians, continuous (not wrapped)
    pub rotation: f64,
    pub render_time: Time,
}

/// The result of sampling the trail at some moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub longitude: f64,
    pub latitude: f64,
    pub rotation: f64,
}

impl Sample {
    pub fn to_lon_lat(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }

    fn lerp(p1: &TrailPoint, p2: &TrailPoint, pct: f64) -> Self {
        Self {
            longitude: p1.longitude + pct * (p2.longitude - p1.longitude),
            latitude: p1.latitude + pct * (p2.latitude - p1.latitude),
            rotation: p1.rotation + pct * (p2.rotation - p1.rotation),
        }
    }
}

impl From<&TrailPoint> for Sample {
    fn from(pt: &TrailPoint) -> Self {
        Self {
            longitude: pt.longitude,
            latitude: pt.latitude,
            rotation: pt.rotation,
        }
    }
}

/// A growing curve through time that can be sampled at any moment.
#[derive(Clone, Debug, Default)]
pub struct SampleTrail {
    // Sorted by render_time, non-decreasing. Equal adjacent times are allowed.
    points: Vec<TrailPoint>,
}

impl SampleTrail {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&TrailPoint> {
        self.points.last()
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn append(&mut self, pt: TrailPoint) -> Result<()> {
        if let Some(last) = self.points.last() {
            if pt.render_time < last.render_time {
                bail!(
                    "SampleTrail out-of-order: {} then {}",
                    last.render_time,
                    pt.render_time
                );
            }
        }
        self.points.push(pt);
        Ok(())
    }

    /// Drops everything from index `start` onwards and appends `replacement`. The kept prefix is
    /// never touched. If the replacement isn't ordered or would go backwards in time, nothing
    /// changes.
    pub fn replace_suffix(&mut self, start: usize, replacement: Vec<TrailPoint>) -> Result<()> {
        if start > self.points.len() {
            bail!(
                "Can't replace SampleTrail from {}; only {} points",
                start,
                self.points.len()
            );
        }
        let mut prev = if start == 0 {
            None
        } else {
            Some(self.points[start - 1].render_time)
        };
        for pt in &replacement {
            if let Some(t) = prev {
                if pt.render_time < t {
                    bail!(
                        "SampleTrail replacement out-of-order: {} then {}",
                        t,
                        pt.render_time
                    );
                }
            }
            prev = Some(pt.render_time);
        }

        self.points.truncate(start);
        self.points.extend(replacement);
        Ok(())
    }

    /// Linearly interpolates longitude, latitude, and rotation at `time`. Outside the trail's
    /// range, returns None, or with `extrapolate`, the nearest end point.
    pub fn sample_at(&self, time: Time, extrapolate: bool) -> Option<Sample> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if time < first.render_time {
            return extrapolate.then(|| Sample::from(first));
        }
        if time >= last.render_time {
            if time > last.render_time && !extrapolate {
                return None;
            }
            return Some(Sample::from(last));
        }

        // The first point strictly after time. first.render_time <= time < last.render_time, so
        // this is in [1, len - 1], and the window has positive length.
        let idx = self.points.partition_point(|pt| pt.render_time <= time);
        let p1 = &self.points[idx - 1];
        let p2 = &self.points[idx];
        let pct = (time - p1.render_time) / (p2.render_time - p1.render_time);
        Some(Sample::lerp(p1, p2, pct))
    }
}

#[cfg(test)]
mod tests {
    use geom::Duration;

    use super::*;

    fn t(secs: f64) -> Time {
        Time::START_OF_DAY + Duration::seconds(secs)
    }

    fn pt(lon: f64, lat: f64, rotation: f64, secs: f64) -> TrailPoint {
        TrailPoint {
            longitude: lon,
            latitude: lat,
            rotation,
            render_time: t(secs),
        }
    }

    fn trail(pts: Vec<TrailPoint>) -> SampleTrail {
        let mut trail = SampleTrail::new();
        trail.replace_suffix(0, pts).unwrap();
        trail
    }

    #[test]
    fn empty_trail_has_nothing() {
        let trail = SampleTrail::new();
        assert_eq!(trail.sample_at(t(0.0), false), None);
        assert_eq!(trail.sample_at(t(0.0), true), None);
    }

    #[test]
    fn midpoint_is_exact_average() {
        let trail = trail(vec![pt(20.0, 10.0, 0.0, 1.0), pt(21.0, 12.0, 1.0, 3.0)]);
        let s = trail.sample_at(t(2.0), false).unwrap();
        assert_eq!(s.longitude, 20.5);
        assert_eq!(s.latitude, 11.0);
        assert_eq!(s.rotation, 0.5);

        let s = trail.sample_at(t(1.5), false).unwrap();
        assert!((s.longitude - 20.25).abs() < 1e-12);
    }

    #[test]
    fn outside_range() {
        let trail = trail(vec![pt(1.0, 1.0, 0.0, 10.0), pt(2.0, 2.0, 0.0, 20.0)]);
        assert_eq!(trail.sample_at(t(5.0), false), None);
        assert_eq!(trail.sample_at(t(25.0), false), None);
        assert_eq!(trail.sample_at(t(5.0), true).unwrap().longitude, 1.0);
        assert_eq!(trail.sample_at(t(25.0), true).unwrap().longitude, 2.0);
        // The end points themselves are inside
        assert_eq!(trail.sample_at(t(10.0), false).unwrap().longitude, 1.0);
        assert_eq!(trail.sample_at(t(20.0), false).unwrap().longitude, 2.0);
    }

    #[test]
    fn single_point() {
        let trail = trail(vec![pt(3.0, 4.0, 1.0, 50.0)]);
        assert_eq!(trail.sample_at(t(50.0), false).unwrap().latitude, 4.0);
        assert_eq!(trail.sample_at(t(0.0), false), None);
        assert_eq!(trail.sample_at(t(1000.0), true).unwrap().latitude, 4.0);
    }

    #[test]
    fn equal_times_pick_the_later_window() {
        let trail = trail(vec![
            pt(0.0, 0.0, 0.0, 0.0),
            pt(1.0, 0.0, 0.0, 10.0),
            pt(5.0, 0.0, 0.0, 10.0),
            pt(7.0, 0.0, 0.0, 20.0),
        ]);
        assert_eq!(trail.sample_at(t(10.0), false).unwrap().longitude, 5.0);
        assert_eq!(trail.sample_at(t(15.0), false).unwrap().longitude, 6.0);
        assert_eq!(trail.sample_at(t(5.0), false).unwrap().longitude, 0.5);
    }

    #[test]
    fn replace_suffix_keeps_prefix_and_order() {
        let mut trail = trail(vec![pt(0.0, 0.0, 0.0, 0.0), pt(1.0, 0.0, 0.0, 10.0)]);
        let last = *trail.last().unwrap();
        trail
            .replace_suffix(1, vec![last, pt(2.0, 0.0, 0.0, 15.0), pt(3.0, 0.0, 0.0, 30.0)])
            .unwrap();
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.points()[0], pt(0.0, 0.0, 0.0, 0.0));
        for pair in trail.points().windows(2) {
            assert!(pair[0].render_time <= pair[1].render_time);
        }

        // Going backwards in time is refused and leaves the trail alone
        assert!(trail.replace_suffix(4, vec![pt(9.0, 0.0, 0.0, 29.0)]).is_err());
        let backwards = vec![pt(9.0, 0.0, 0.0, 12.0), pt(9.0, 0.0, 0.0, 11.0)];
        assert!(trail.replace_suffix(2, backwards).is_err());
        assert!(trail.replace_suffix(5, Vec::new()).is_err());
        assert_eq!(trail.len(), 4);

        assert!(trail.append(pt(4.0, 0.0, 0.0, 29.0)).is_err());
        trail.append(pt(4.0, 0.0, 0.0, 30.0)).unwrap();
        assert_eq!(trail.len(), 5);
    }
}
