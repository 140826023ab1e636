//! Backend capability table
//!
//! Which logical buttons exist per backend and per hand, and whether they
//! can be clicked, touched or both.

use crate::mapping::mapping_types::{Backend, Hand, InteractionType, LogicalButton};

const BOTH: InteractionType = InteractionType::CLICK.union(InteractionType::TOUCH);
const CLICK: InteractionType = InteractionType::CLICK;
const TOUCH: InteractionType = InteractionType::TOUCH;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonCapability {
    pub button: LogicalButton,
    pub interactions: InteractionType,
}

const fn cap(button: LogicalButton, interactions: InteractionType) -> ButtonCapability {
    ButtonCapability {
        button,
        interactions,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BackendCapabilities {
    pub backend: Backend,
    pub left: &'static [ButtonCapability],
    pub right: &'static [ButtonCapability],
}

impl BackendCapabilities {
    pub fn for_hand(&self, hand: Hand) -> &'static [ButtonCapability] {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
            Hand::Gaze | Hand::Unset => &[],
        }
    }

    /// Interactions supported by the button on the given hand, `None` if absent
    pub fn lookup(&self, hand: Hand, button: LogicalButton) -> Option<InteractionType> {
        self.for_hand(hand)
            .iter()
            .find(|c| c.button == button)
            .map(|c| c.interactions)
    }

    /// Union of what the button supports over both hands, `None` if absent
    pub fn lookup_any_hand(&self, button: LogicalButton) -> Option<InteractionType> {
        let left = self.lookup(Hand::Left, button);
        let right = self.lookup(Hand::Right, button);
        match (left, right) {
            (None, None) => None,
            (l, r) => Some(l.unwrap_or_default() | r.unwrap_or_default()),
        }
    }
}

const TETHERED_A_LEFT: &[ButtonCapability] = &[
    cap(LogicalButton::Trigger, BOTH),
    cap(LogicalButton::Grip, CLICK),
    cap(LogicalButton::Thumbstick, BOTH),
    cap(LogicalButton::ThumbRest, TOUCH),
    cap(LogicalButton::XButton, BOTH),
    cap(LogicalButton::YButton, BOTH),
    cap(LogicalButton::Menu, CLICK),
];

const TETHERED_A_RIGHT: &[ButtonCapability] = &[
    cap(LogicalButton::Trigger, BOTH),
    cap(LogicalButton::Grip, CLICK),
    cap(LogicalButton::Thumbstick, BOTH),
    cap(LogicalButton::ThumbRest, TOUCH),
    cap(LogicalButton::AButton, BOTH),
    cap(LogicalButton::BButton, BOTH),
];

const TETHERED_B_HAND: &[ButtonCapability] = &[
    cap(LogicalButton::Trigger, BOTH),
    cap(LogicalButton::Grip, CLICK),
    cap(LogicalButton::Thumbstick, BOTH),
    cap(LogicalButton::Menu, CLICK),
];

const SIMULATOR_LEFT: &[ButtonCapability] = &[
    cap(LogicalButton::Trigger, CLICK),
    cap(LogicalButton::Grip, CLICK),
    cap(LogicalButton::Thumbstick, BOTH),
    cap(LogicalButton::Menu, CLICK),
];

const SIMULATOR_RIGHT: &[ButtonCapability] = &[
    cap(LogicalButton::Trigger, CLICK),
    cap(LogicalButton::Grip, CLICK),
    cap(LogicalButton::Thumbstick, BOTH),
    cap(LogicalButton::Menu, CLICK),
    cap(LogicalButton::Wheel, CLICK),
];

pub const DEFAULT_CAPABILITIES: [BackendCapabilities; 3] = [
    BackendCapabilities {
        backend: Backend::TetheredA,
        left: TETHERED_A_LEFT,
        right: TETHERED_A_RIGHT,
    },
    BackendCapabilities {
        backend: Backend::TetheredB,
        left: TETHERED_B_HAND,
        right: TETHERED_B_HAND,
    },
    BackendCapabilities {
        backend: Backend::Simulator,
        left: SIMULATOR_LEFT,
        right: SIMULATOR_RIGHT,
    },
];

/// Read-only table consulted by the resolver
#[derive(Clone, Debug)]
pub struct CapabilityTable {
    entries: &'static [BackendCapabilities],
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self {
            entries: &DEFAULT_CAPABILITIES,
        }
    }
}

impl CapabilityTable {
    pub fn new(entries: &'static [BackendCapabilities]) -> Self {
        Self { entries }
    }

    pub fn backend(&self, backend: Backend) -> Option<&BackendCapabilities> {
        self.entries.iter().find(|e| e.backend == backend)
    }

    /// Backends on which the button exists for at least one hand
    pub fn backends_providing(&self, button: LogicalButton) -> Vec<Backend> {
        self.entries
            .iter()
            .filter(|e| e.lookup_any_hand(button).is_some())
            .map(|e| e.backend)
            .collect()
    }
}
