use geom::LonLat;
use serde::{Deserialize, Serialize};

/// One raw location update, exactly as it arrived. Never modified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees clockwise from north, if the source knows it
    pub heading: Option<f64>,
    pub timestamp_ms: i64,
    /// Recorded while paused. Still kept, but doesn't extend the trail.
    pub omit: bool,
}

impl PositionRecord {
    /// None if the coordinates aren't usable
    pub fn lon_lat(&self) -> Option<LonLat> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return None;
        }
        if self.latitude.abs() > 90.0 || self.longitude.abs() > 180.0 {
            return None;
        }
        Some(LonLat::new(self.longitude, self.latitude))
    }
}

/// Every record supplied during one session, in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLog {
    records: Vec<PositionRecord>,
}

impl PositionLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, rec: PositionRecord) {
        self.records.push(rec);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&PositionRecord> {
        self.records.get(idx)
    }

    pub fn last(&self) -> Option<&PositionRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionRecord> {
        self.records.iter()
    }

    pub fn omitted_count(&self) -> usize {
        self.records.iter().filter(|rec| rec.omit).count()
    }

    /// The route actually traced: usable positions that weren't recorded while paused.
    pub fn recorded_route(&self) -> Vec<LonLat> {
        self.records
            .iter()
            .filter(|rec| !rec.omit)
            .filter_map(|rec| rec.lon_lat())
            .collect()
    }
}
