//! Shared vocabulary of the BAC engine
//!
//! Logical buttons, hands, interaction flags, thumbstick regions and backends.
//! Everything in here is plain data; behaviour lives in the resolver, the
//! threshold evaluator, the timer gate and the dispatcher.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract, backend independent input identifier
///
/// There is no gaze-click variant. A gaze click is the backend's gaze click
/// button (see `EngineSettings::gaze_click_buttons`) read on [`Hand::Gaze`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicalButton {
    Trigger,
    Grip,
    Menu,
    Thumbstick,
    ThumbRest,
    AButton,
    BButton,
    XButton,
    YButton,
    Wheel,
}

impl LogicalButton {
    pub const ALL: [LogicalButton; 10] = [
        LogicalButton::Trigger,
        LogicalButton::Grip,
        LogicalButton::Menu,
        LogicalButton::Thumbstick,
        LogicalButton::ThumbRest,
        LogicalButton::AButton,
        LogicalButton::BButton,
        LogicalButton::XButton,
        LogicalButton::YButton,
        LogicalButton::Wheel,
    ];

    /// Side implied by the identity of the button, if any
    pub fn implied_hand(self) -> Option<Hand> {
        match self {
            LogicalButton::AButton | LogicalButton::BButton | LogicalButton::Wheel => {
                Some(Hand::Right)
            }
            LogicalButton::XButton | LogicalButton::YButton => Some(Hand::Left),
            _ => None,
        }
    }

    pub fn is_thumbstick(self) -> bool {
        self == LogicalButton::Thumbstick
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalButton::Trigger => "Trigger",
            LogicalButton::Grip => "Grip",
            LogicalButton::Menu => "Menu",
            LogicalButton::Thumbstick => "Thumbstick",
            LogicalButton::ThumbRest => "ThumbRest",
            LogicalButton::AButton => "A",
            LogicalButton::BButton => "B",
            LogicalButton::XButton => "X",
            LogicalButton::YButton => "Y",
            LogicalButton::Wheel => "Wheel",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
    /// Pseudo hand carrying gaze clicks, published under the backend's gaze click button
    Gaze,
    #[default]
    Unset,
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hand::Left => write!(f, "Left"),
            Hand::Right => write!(f, "Right"),
            Hand::Gaze => write!(f, "Gaze"),
            Hand::Unset => write!(f, "Unset"),
        }
    }
}

bitflags! {
    /// Which event pairs a binding can ever emit
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct InteractionType: u8 {
        const CLICK = 0b01;
        const TOUCH = 0b10;
    }
}

impl InteractionType {
    pub const NONE: InteractionType = InteractionType::empty();
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.contains(Self::CLICK), self.contains(Self::TOUCH)) {
            (true, true) => write!(f, "Click+Touch"),
            (true, false) => write!(f, "Click"),
            (false, true) => write!(f, "Touch"),
            (false, false) => write!(f, "None"),
        }
    }
}

/// The two event families a binding tracks independently
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Click,
    Touch,
}

impl InteractionKind {
    pub fn flag(self) -> InteractionType {
        match self {
            InteractionKind::Click => InteractionType::CLICK,
            InteractionKind::Touch => InteractionType::TOUCH,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Click => write!(f, "click"),
            InteractionKind::Touch => write!(f, "touch"),
        }
    }
}

/// Sub-area of a thumbstick a binding reacts to
///
/// `Any` counts every deflection by its magnitude, the directional
/// variants project the position onto their axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThumbRegion {
    Any,
    Up,
    Down,
    Left,
    Right,
}

impl ThumbRegion {
    /// Scalar projection of a stick position onto this region
    pub fn project(self, x: f32, y: f32) -> f32 {
        match self {
            ThumbRegion::Any => (x.powi(2) + y.powi(2)).sqrt().min(1.0),
            ThumbRegion::Up => y,
            ThumbRegion::Down => -y,
            ThumbRegion::Right => x,
            ThumbRegion::Left => -x,
        }
    }
}

/// Active VR / input SDK
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Backend {
    TetheredA,
    TetheredB,
    Simulator,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::TetheredA, Backend::TetheredB, Backend::Simulator];
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::TetheredA => write!(f, "TetheredA"),
            Backend::TetheredB => write!(f, "TetheredB"),
            Backend::Simulator => write!(f, "Simulator"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerMode {
    /// Deliver only holds released before the duration elapsed
    BeforeThreshold,
    /// Deliver only once the hold outlasted the duration
    AfterThreshold,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerPolicy {
    /// Seconds
    pub duration: f32,
    pub mode: TimerMode,
}

/// Key of the raw-input table and of the listener registry
pub type InputKey = (Hand, LogicalButton);
