//! Source wiring - connects a resolved binding to the published raw input
//!
//! A missing key is not an error: the collaborator may not have registered
//! its channels yet, so the engine simply tries again next frame.

use crate::controller::input_table::ButtonSample;
use crate::mapping::context::EngineContext;
use crate::mapping::mapping_types::{Hand, LogicalButton};
use crate::mapping::resolver::ResolvedBinding;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WiringStatus {
    Wired,
    Deferred,
}

/// Live read handle onto one `(hand, button)` channel
#[derive(Debug, Clone)]
pub struct SourceHandle {
    hand: Hand,
    button: LogicalButton,
    receiver: watch::Receiver<ButtonSample>,
}

impl SourceHandle {
    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn button(&self) -> LogicalButton {
        self.button
    }

    /// Latest published sample
    pub fn sample(&self) -> ButtonSample {
        *self.receiver.borrow()
    }

    pub fn click_down(&self) -> bool {
        self.receiver.borrow().click_down
    }

    pub fn touch_down(&self) -> bool {
        self.receiver.borrow().touch_down
    }

    pub fn thumb_position(&self) -> (f32, f32) {
        self.receiver.borrow().thumb_position
    }

    /// The publishing side went away, e.g. the collaborator was torn down
    pub fn is_closed(&self) -> bool {
        self.receiver.has_changed().is_err()
    }
}

/// Looks up the resolved key in the raw input table
pub fn wire(resolved: &ResolvedBinding, ctx: &EngineContext) -> Option<SourceHandle> {
    match ctx.input().subscribe(resolved.hand, resolved.button) {
        Some(receiver) => {
            debug!("Wired {} {}", resolved.hand, resolved.button);
            Some(SourceHandle {
                hand: resolved.hand,
                button: resolved.button,
                receiver,
            })
        }
        None => {
            debug!(
                "Raw input for {} {} not available yet, deferring",
                resolved.hand, resolved.button
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::mapping_types::{Backend, InteractionType};

    fn resolved() -> ResolvedBinding {
        ResolvedBinding {
            hand: Hand::Right,
            button: LogicalButton::Trigger,
            interaction: InteractionType::CLICK,
            backend: Backend::Simulator,
        }
    }

    #[test]
    fn wiring_is_deferred_until_the_key_exists() {
        let mut ctx = EngineContext::default();
        assert!(wire(&resolved(), &ctx).is_none());

        ctx.input_mut().register(Hand::Right, LogicalButton::Trigger);
        let handle = wire(&resolved(), &ctx).unwrap();
        assert!(!handle.click_down());

        ctx.input_mut()
            .publish(Hand::Right, LogicalButton::Trigger, ButtonSample::clicked());
        assert!(handle.click_down());
        assert!(handle.touch_down());
    }

    #[test]
    fn cleared_table_closes_the_handle() {
        let mut ctx = EngineContext::default();
        ctx.input_mut().register(Hand::Right, LogicalButton::Trigger);
        let handle = wire(&resolved(), &ctx).unwrap();
        ctx.input_mut().clear();
        assert!(handle.is_closed());
    }
}
