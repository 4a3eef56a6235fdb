use anyhow::Result;
use geom::Time;

use crate::controls::{Button, ControlState, ControlSurface, Controls, Effect};
use crate::host::MapHost;
use crate::sampler::{Frame, RenderSampler};
use crate::source::LocationEvent;
use crate::{PositionLog, PositionRecord, TracerConfig, TracingSession};

/// How a session ended
#[derive(Debug, PartialEq)]
pub enum SessionOutcome {
    Saved(PositionLog),
    Cancelled,
}

/// Ties the controls, the recorded positions, and the per-frame sampling together. The host
/// forwards three kinds of events here: button presses, location updates, and display frames.
/// They can arrive in any order.
pub struct Tracer {
    controls: Controls,
    session: TracingSession,
    sampler: RenderSampler,
    listening: bool,
}

impl Tracer {
    pub fn new(config: &TracerConfig, surface: &mut dyn ControlSurface) -> Self {
        let controls = Controls::new(surface);
        let listening = controls.state().entry_effect() == Effect::Listen;
        Self {
            controls,
            session: TracingSession::new(),
            sampler: RenderSampler::new(config),
            listening,
        }
    }

    pub fn state(&self) -> ControlState {
        self.controls.state()
    }

    pub fn paused(&self) -> bool {
        self.controls.paused()
    }

    /// Once false, the location source should stop producing.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn log(&self) -> &PositionLog {
        self.session.log()
    }

    pub fn sampler(&self) -> &RenderSampler {
        &self.sampler
    }

    /// Returns the outcome if this press ended the session.
    pub fn press(
        &mut self,
        button: Button,
        surface: &mut dyn ControlSurface,
    ) -> Result<Option<SessionOutcome>> {
        match self.controls.press(button, surface)? {
            Effect::Listen => {
                self.listening = true;
                Ok(None)
            }
            Effect::SetPaused(_) => Ok(None),
            Effect::Finish { save } => {
                self.listening = false;
                let log = self.session.complete()?;
                if save {
                    Ok(Some(SessionOutcome::Saved(log)))
                } else {
                    info!("Discarding {} positions", log.len());
                    Ok(Some(SessionOutcome::Cancelled))
                }
            }
        }
    }

    /// A fix is tagged with whether tracing is paused right now, and that never changes later.
    pub fn on_location(&mut self, event: LocationEvent, host: &mut dyn MapHost) -> Result<()> {
        match event {
            LocationEvent::Fix(fix) => {
                if !self.listening {
                    bail!(
                        "Not listening for positions anymore; got one at {}",
                        fix.timestamp_ms
                    );
                }
                let rec = PositionRecord {
                    latitude: fix.latitude,
                    longitude: fix.longitude,
                    heading: fix.heading,
                    timestamp_ms: fix.timestamp_ms,
                    omit: self.controls.paused(),
                };
                self.session.supply(rec, host)
            }
            LocationEvent::Failure(err) => {
                warn!("Location source failed: {}", err);
                Ok(())
            }
            LocationEvent::Stop => {
                info!("Location source stopped");
                Ok(())
            }
        }
    }

    pub fn on_frame(&mut self, now: Time, host: &mut dyn MapHost) -> Option<Frame> {
        if self.session.is_done() {
            return None;
        }
        self.sampler.frame(self.session.log(), now, host)
    }
}
