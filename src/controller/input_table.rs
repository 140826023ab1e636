//! Raw input table - boundary to the per-backend polling code
//!
//! Every `(hand, button)` pair a collaborator knows about owns a watch channel.
//! Collaborators publish the latest debounced sample, source wiring holds the
//! receiving side and reads it once per frame.

use crate::mapping::mapping_types::{Hand, InputKey, LogicalButton};
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{debug, info};

/// Latest sampled state of one physical input
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ButtonSample {
    pub click_down: bool,
    pub touch_down: bool,
    /// Only meaningful for thumbstick capable buttons, each axis in [-1, 1]
    pub thumb_position: (f32, f32),
}

impl ButtonSample {
    pub fn released() -> Self {
        Self::default()
    }

    pub fn clicked() -> Self {
        Self {
            click_down: true,
            touch_down: true,
            thumb_position: (0.0, 0.0),
        }
    }

    pub fn touched() -> Self {
        Self {
            click_down: false,
            touch_down: true,
            thumb_position: (0.0, 0.0),
        }
    }

    pub fn with_thumb(mut self, x: f32, y: f32) -> Self {
        self.thumb_position = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        self
    }
}

/// Table of published input channels keyed by `(hand, button)`
#[derive(Debug, Default)]
pub struct RawInputTable {
    channels: HashMap<InputKey, watch::Sender<ButtonSample>>,
}

impl RawInputTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a key available for wiring, keeps the current value if it already exists
    pub fn register(&mut self, hand: Hand, button: LogicalButton) {
        self.channels.entry((hand, button)).or_insert_with(|| {
            debug!("Registering raw input channel {} {}", hand, button);
            watch::channel(ButtonSample::default()).0
        });
    }

    /// Publishes a new sample, registering the key on first use
    pub fn publish(&mut self, hand: Hand, button: LogicalButton, sample: ButtonSample) {
        self.register(hand, button);
        if let Some(sender) = self.channels.get(&(hand, button)) {
            sender.send_replace(sample);
        }
    }

    pub fn subscribe(&self, hand: Hand, button: LogicalButton) -> Option<watch::Receiver<ButtonSample>> {
        self.channels.get(&(hand, button)).map(|s| s.subscribe())
    }

    pub fn contains(&self, hand: Hand, button: LogicalButton) -> bool {
        self.channels.contains_key(&(hand, button))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Drops every channel, live receivers observe the closed sender
    pub fn clear(&mut self) {
        info!("Clearing {} raw input channels", self.channels.len());
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_published_samples() {
        let mut table = RawInputTable::new();
        assert!(table.subscribe(Hand::Right, LogicalButton::Trigger).is_none());

        table.register(Hand::Right, LogicalButton::Trigger);
        let rx = table.subscribe(Hand::Right, LogicalButton::Trigger).unwrap();
        assert_eq!(*rx.borrow(), ButtonSample::released());

        table.publish(Hand::Right, LogicalButton::Trigger, ButtonSample::clicked());
        assert!(rx.borrow().click_down);
    }

    #[test]
    fn clearing_closes_receivers() {
        let mut table = RawInputTable::new();
        table.publish(Hand::Left, LogicalButton::Grip, ButtonSample::clicked());
        let rx = table.subscribe(Hand::Left, LogicalButton::Grip).unwrap();
        table.clear();
        assert!(table.is_empty());
        assert!(rx.has_changed().is_err());
    }

    #[test]
    fn thumb_positions_are_clamped() {
        let sample = ButtonSample::touched().with_thumb(1.5, -2.0);
        assert_eq!(sample.thumb_position, (1.0, -1.0));
    }
}
