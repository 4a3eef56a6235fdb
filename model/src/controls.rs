use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The three controls, by position
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Center,
    Right,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Left, Button::Center, Button::Right];
}

impl FromStr for Button {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x.to_lowercase().as_ref() {
            "left" => Ok(Button::Left),
            "center" => Ok(Button::Center),
            "right" => Ok(Button::Right),
            _ => bail!("Unknown button {}; use left, center, or right", x),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ControlState {
    /// Listening and showing the marker, but not recording yet
    Standby,
    Start,
    Pause,
    Resume,
    Save,
    Cancel,
}

impl ControlState {
    /// Where each button leads from here. None means the button does nothing.
    pub fn target(self, button: Button) -> Option<ControlState> {
        use Button::*;
        use ControlState::*;

        match (self, button) {
            (Standby, Left) => None,
            (Standby, Center) => Some(Start),
            (Start | Pause | Resume, Left) => Some(Save),
            (Start | Resume, Center) => Some(Pause),
            (Pause, Center) => Some(Resume),
            (Standby | Start | Pause | Resume, Right) => Some(Cancel),
            (Save | Cancel, _) => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ControlState::Save | ControlState::Cancel)
    }

    /// What happens upon entering this state
    pub fn entry_effect(self) -> Effect {
        match self {
            ControlState::Standby => Effect::Listen,
            ControlState::Start | ControlState::Resume => Effect::SetPaused(false),
            ControlState::Pause => Effect::SetPaused(true),
            ControlState::Save => Effect::Finish { save: true },
            ControlState::Cancel => Effect::Finish { save: false },
        }
    }

    /// How a button leading to this state should look
    fn binding(self) -> Binding {
        let (icon, label, title) = match self {
            ControlState::Standby => ("locate", "Standby", "Wait for a position"),
            ControlState::Start => ("play", "Start", "Start tracing"),
            ControlState::Pause => ("pause", "Pause", "Pause tracing"),
            ControlState::Resume => ("play", "Resume", "Resume tracing"),
            ControlState::Save => ("save", "Save", "Save the trail"),
            ControlState::Cancel => ("close", "Cancel", "Discard the trail"),
        };
        Binding {
            target: self,
            icon,
            label,
            title,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Listen,
    SetPaused(bool),
    Finish { save: bool },
}

/// What a control currently shows and does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub target: ControlState,
    pub icon: &'static str,
    pub label: &'static str,
    pub title: &'static str,
}

/// The three on-screen controls. Every transition rebinds all of them.
pub trait ControlSurface {
    /// None disables the button
    fn bind(&mut self, button: Button, binding: Option<Binding>);
}

/// Remembers the current bindings
#[derive(Default)]
pub struct ControlPanel {
    bindings: BTreeMap<Button, Binding>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self, button: Button) -> Option<&Binding> {
        self.bindings.get(&button)
    }

    /// Like the controls would read on screen, for logging
    pub fn describe(&self) -> String {
        Button::ALL
            .iter()
            .map(|b| match self.bindings.get(b) {
                Some(binding) => format!("[{}]", binding.label),
                None => "[ ]".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ControlSurface for ControlPanel {
    fn bind(&mut self, button: Button, binding: Option<Binding>) {
        match binding {
            Some(binding) => {
                self.bindings.insert(button, binding);
            }
            None => {
                self.bindings.remove(&button);
            }
        }
    }
}

/// Start/pause/resume/save/cancel. Owns the paused flag that tags incoming positions.
pub struct Controls {
    state: ControlState,
    paused: bool,
}

impl Controls {
    /// Starts in standby. Nothing is recorded until the user starts.
    pub fn new(surface: &mut dyn ControlSurface) -> Self {
        let controls = Self {
            state: ControlState::Standby,
            paused: true,
        };
        controls.rebind(surface);
        controls
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn press(&mut self, button: Button, surface: &mut dyn ControlSurface) -> Result<Effect> {
        let next = match self.state.target(button) {
            Some(x) => x,
            None => bail!("{:?} does nothing in {:?}", button, self.state),
        };
        info!("{:?} pressed: {:?} -> {:?}", button, self.state, next);
        self.state = next;

        let effect = next.entry_effect();
        if let Effect::SetPaused(paused) = effect {
            self.paused = paused;
        }
        self.rebind(surface);
        Ok(effect)
    }

    fn rebind(&self, surface: &mut dyn ControlSurface) {
        for button in Button::ALL {
            surface.bind(button, self.state.target(button).map(|s| s.binding()));
        }
    }
}
