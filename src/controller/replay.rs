//! Scripted raw-input collaborator
//!
//! Replays a TOML script of button samples into the [`RawInputTable`] owned
//! by the engine context. Stands in for the per-backend polling code: it can
//! hold back channel registration for a few frames to mimic a slow device
//! bring-up, and it can switch the active backend mid-run.

use crate::controller::input_table::ButtonSample;
use crate::mapping::context::EngineContext;
use crate::mapping::mapping_types::{Backend, Hand, InputKey, LogicalButton};
use serde::{Deserialize, Serialize};
use statum::{machine, state};
use std::collections::BTreeSet;
use tracing::{debug, info};

fn default_dt() -> f32 {
    1.0 / 90.0
}

fn default_repeat() -> u32 {
    1
}

/// One published sample inside a script frame
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ScriptSample {
    pub hand: Hand,
    pub button: LogicalButton,
    #[serde(default)]
    pub click: bool,
    #[serde(default)]
    pub touch: bool,
    #[serde(default)]
    pub thumb: (f32, f32),
}

impl ScriptSample {
    pub fn to_sample(&self) -> ButtonSample {
        ButtonSample {
            click_down: self.click,
            // a clicked button is always touched
            touch_down: self.touch || self.click,
            thumb_position: (0.0, 0.0),
        }
        .with_thumb(self.thumb.0, self.thumb.1)
    }
}

/// Changes applied at one point of the script, held for `repeat` frames
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ScriptFrame {
    #[serde(default)]
    pub dt: Option<f32>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub samples: Vec<ScriptSample>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ReplayScript {
    pub name: String,
    /// Frames before the collaborator registers its channels
    #[serde(default)]
    pub init_delay_frames: u32,
    #[serde(default = "default_dt")]
    pub default_dt: f32,
    #[serde(default)]
    pub frames: Vec<ScriptFrame>,
}

impl ReplayScript {
    pub fn from_toml(content: &str) -> Result<Self, CollectorError> {
        toml::from_str(content).map_err(|e| CollectorError::ParseError(e.to_string()))
    }

    /// Total number of frames the script spans, init delay included
    pub fn frame_count(&self) -> u64 {
        self.init_delay_frames as u64 + self.frames.iter().map(|f| f.repeat as u64).sum::<u64>()
    }

    /// Every key the script ever publishes to
    pub fn keys(&self) -> BTreeSet<InputKey> {
        self.frames
            .iter()
            .flat_map(|f| f.samples.iter().map(|s| (s.hand, s.button)))
            .collect()
    }

    fn validate(&self) -> Result<(), CollectorError> {
        let valid_dt = |dt: f32| dt.is_finite() && dt > 0.0;
        if !valid_dt(self.default_dt) {
            return Err(CollectorError::InvalidScript(format!(
                "default_dt must be positive, got {}",
                self.default_dt
            )));
        }
        for (idx, frame) in self.frames.iter().enumerate() {
            if let Some(dt) = frame.dt {
                if !valid_dt(dt) {
                    return Err(CollectorError::InvalidScript(format!(
                        "frame {} has invalid dt {}",
                        idx, dt
                    )));
                }
            }
            if frame.repeat == 0 {
                return Err(CollectorError::InvalidScript(format!(
                    "frame {} repeats zero times",
                    idx
                )));
            }
        }
        Ok(())
    }
}

// Collector errors
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to parse replay script: {0}")]
    ParseError(String),

    #[error("Invalid replay script: {0}")]
    InvalidScript(String),
}

#[state]
#[derive(Debug, Clone)]
pub enum ReplayState {
    Initializing,
    Collecting,
}

#[machine]
#[derive(Debug)]
pub struct ReplayCollector<S: ReplayState> {
    script: ReplayScript,
    // Index into script.frames
    cursor: usize,
    // Frames left on the current script entry
    repeat_left: u32,
    init_delay_left: u32,
    registered: bool,
    frames_played: u64,
}

impl<S: ReplayState> ReplayCollector<S> {
    pub fn script(&self) -> &ReplayScript {
        &self.script
    }

    pub fn frames_played(&self) -> u64 {
        self.frames_played
    }
}

impl ReplayCollector<Initializing> {
    pub fn create(script: ReplayScript) -> Result<Self, CollectorError> {
        script.validate()?;
        debug!(
            "Creating replay collector for {} ({} frames)",
            script.name,
            script.frame_count()
        );
        let init_delay_left = script.init_delay_frames;
        Ok(Self::new(
            script,
            0,     // cursor
            0,     // repeat_left
            init_delay_left,
            false, // registered
            0,     // frames_played
        ))
    }

    pub fn initialize(self) -> ReplayCollector<Collecting> {
        info!(
            "Replay collector {} initialized, {} keys, channels available after {} frames",
            self.script.name,
            self.script.keys().len(),
            self.init_delay_left
        );
        self.transition()
    }
}

impl ReplayCollector<Collecting> {
    pub fn is_finished(&self) -> bool {
        self.init_delay_left == 0 && self.cursor >= self.script.frames.len()
    }

    /// Publishes the next frame into the context, returns its delta time
    ///
    /// Returns `None` once the script is exhausted. The last published
    /// samples stay in the table.
    pub fn step(&mut self, ctx: &mut EngineContext) -> Option<f32> {
        if self.init_delay_left > 0 {
            self.init_delay_left -= 1;
            self.frames_played += 1;
            debug!("Collaborator still initializing, {} frames left", self.init_delay_left);
            return Some(self.script.default_dt);
        }

        if !self.registered {
            for (hand, button) in self.script.keys() {
                ctx.input_mut().register(hand, button);
            }
            self.registered = true;
            info!("Replay collector registered {} channels", ctx.input().len());
        }

        let frame = self.script.frames.get(self.cursor)?;
        if self.repeat_left == 0 {
            // First frame of this entry: apply changes once
            self.repeat_left = frame.repeat;
            if let Some(backend) = frame.backend {
                ctx.set_backend(backend);
            }
            for sample in &frame.samples {
                ctx.input_mut()
                    .publish(sample.hand, sample.button, sample.to_sample());
            }
        }

        let dt = frame.dt.unwrap_or(self.script.default_dt);
        self.repeat_left -= 1;
        if self.repeat_left == 0 {
            self.cursor += 1;
        }
        self.frames_played += 1;
        Some(dt)
    }
}
