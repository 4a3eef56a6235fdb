//! Turns a live, irregular stream of positions into a smoothly animated marker and a recorded
//! trail, with start/pause/resume/save/cancel controls.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod config;
mod controls;
mod host;
mod position_log;
mod rate;
pub mod rotation;
mod sample_trail;
mod sampler;
mod session;
mod source;
mod tracer;

pub use self::config::TracerConfig;
pub use self::controls::{
    Binding, Button, ControlPanel, ControlState, ControlSurface, Controls, Effect,
};
pub use self::host::{MapHost, Projection, RecordingHost};
pub use self::position_log::{PositionLog, PositionRecord};
pub use self::rate::SamplingRateEstimator;
pub use self::sample_trail::{Sample, SampleTrail, TrailPoint};
pub use self::sampler::{FoldedMarker, Frame, RenderSampler};
pub use self::session::TracingSession;
pub use self::source::{LocationEvent, LocationFix, LocationSource, ReplaySource};
pub use self::tracer::{SessionOutcome, Tracer};
