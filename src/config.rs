use crate::mapping::mapping_types::{Backend, LogicalButton};
use serde::{Deserialize, Serialize};

/// Default grace added on top of a BeforeThreshold duration before a pending tap expires
pub const DEFAULT_BEFORE_THRESHOLD_GRACE: f32 = 0.1;

/// Engine wide settings shared by every binding
///
/// Serialized as the `[settings]` table of a binding profile.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Backend activated when the engine starts
    pub initial_backend: Backend,

    /// Global switch for every gaze driven binding
    pub gaze_enabled: bool,

    /// Seconds a BeforeThreshold hold may exceed its duration before it is dropped
    pub before_threshold_grace: f32,

    /// Frames per second used by the replay driver
    pub frame_rate: u32,

    /// Button that acts as the gaze click, per backend. Missing entry means none.
    pub gaze_click_buttons: Vec<GazeClickButton>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let gaze_click_buttons = vec![
            GazeClickButton::new(Backend::TetheredA, LogicalButton::AButton),
            GazeClickButton::new(Backend::TetheredB, LogicalButton::Trigger),
            GazeClickButton::new(Backend::Simulator, LogicalButton::Wheel),
        ];

        Self {
            initial_backend: Backend::Simulator,
            gaze_enabled: true,
            before_threshold_grace: DEFAULT_BEFORE_THRESHOLD_GRACE,
            frame_rate: 90,
            gaze_click_buttons,
        }
    }
}

impl EngineSettings {
    pub fn gaze_click_button_for(&self, backend: Backend) -> Option<LogicalButton> {
        self.gaze_click_buttons
            .iter()
            .find(|g| g.backend == backend)
            .map(|g| g.button)
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct GazeClickButton {
    pub backend: Backend,
    pub button: LogicalButton,
}

impl GazeClickButton {
    pub fn new(backend: Backend, button: LogicalButton) -> Self {
        Self { backend, button }
    }
}
