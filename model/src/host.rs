use geom::{GPSBounds, LonLat, Pt2D};

/// Turns geographic positions into the map's display coordinates. Must be deterministic.
pub trait Projection {
    fn project(&self, pos: LonLat) -> Pt2D;
}

impl Projection for GPSBounds {
    fn project(&self, pos: LonLat) -> Pt2D {
        pos.to_pt(self)
    }
}

/// Whatever draws the map. The engine only ever pushes things to it.
pub trait MapHost: Projection {
    fn show_marker(&mut self, pos: Pt2D, rotation: f64);
    /// Nothing valid to show yet
    fn hide_marker(&mut self);
    /// Append-only; the engine never rewrites earlier preview points.
    fn extend_preview(&mut self, pos: Pt2D);
    /// Fire-and-forget. The host should run another frame soon.
    fn request_redraw(&mut self);
}

/// Keeps everything the engine pushed, in memory.
pub struct RecordingHost {
    gps_bounds: GPSBounds,
    pub marker: Option<(Pt2D, f64)>,
    pub preview: Vec<Pt2D>,
    pub redraws_requested: usize,
}

impl RecordingHost {
    pub fn new(gps_bounds: GPSBounds) -> Self {
        Self {
            gps_bounds,
            marker: None,
            preview: Vec::new(),
            redraws_requested: 0,
        }
    }

    pub fn gps_bounds(&self) -> &GPSBounds {
        &self.gps_bounds
    }
}

impl Projection for RecordingHost {
    fn project(&self, pos: LonLat) -> Pt2D {
        self.gps_bounds.project(pos)
    }
}

impl MapHost for RecordingHost {
    fn show_marker(&mut self, pos: Pt2D, rotation: f64) {
        self.marker = Some((pos, rotation));
    }

    fn hide_marker(&mut self) {
        self.marker = None;
    }

    fn extend_preview(&mut self, pos: Pt2D) {
        self.preview.push(pos);
    }

    fn request_redraw(&mut self) {
        self.redraws_requested += 1;
    }
}
