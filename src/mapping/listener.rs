//! Feature listeners and the publish/subscribe registry
//!
//! Features implement [`FeatureListener`] for the subset of events they care
//! about and subscribe to a `(hand, button)` pair. Every binding resolved to
//! that pair delivers to them. The returned [`Subscription`] removes the
//! listener when it is dropped or explicitly unsubscribed.

use crate::mapping::mapping_types::{Hand, InputKey, InteractionKind, LogicalButton};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use tracing::{debug, error, warn};

/// What a listener gets to know about the event it receives
#[derive(Clone, Copy, Debug)]
pub struct EventContext<'a> {
    pub feature: &'a str,
    pub hand: Hand,
    pub button: LogicalButton,
    /// Timer of the emitting binding, if it is gated
    pub timer_elapsed: Option<f32>,
    pub frame: u64,
}

/// Capability set a feature implements; every hook defaults to doing nothing
pub trait FeatureListener {
    fn on_start_click(&mut self, _ctx: &EventContext<'_>) {}
    fn on_is_clicking(&mut self, _ctx: &EventContext<'_>) {}
    fn on_stop_click(&mut self, _ctx: &EventContext<'_>) {}
    fn on_start_touch(&mut self, _ctx: &EventContext<'_>) {}
    fn on_is_touching(&mut self, _ctx: &EventContext<'_>) {}
    fn on_stop_touch(&mut self, _ctx: &EventContext<'_>) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SemanticEvent {
    StartClick,
    IsClicking,
    StopClick,
    StartTouch,
    IsTouching,
    StopTouch,
}

impl SemanticEvent {
    pub fn start(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Click => SemanticEvent::StartClick,
            InteractionKind::Touch => SemanticEvent::StartTouch,
        }
    }

    pub fn is_interacting(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Click => SemanticEvent::IsClicking,
            InteractionKind::Touch => SemanticEvent::IsTouching,
        }
    }

    pub fn stop(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Click => SemanticEvent::StopClick,
            InteractionKind::Touch => SemanticEvent::StopTouch,
        }
    }

    pub fn deliver(self, listener: &mut dyn FeatureListener, ctx: &EventContext<'_>) {
        match self {
            SemanticEvent::StartClick => listener.on_start_click(ctx),
            SemanticEvent::IsClicking => listener.on_is_clicking(ctx),
            SemanticEvent::StopClick => listener.on_stop_click(ctx),
            SemanticEvent::StartTouch => listener.on_start_touch(ctx),
            SemanticEvent::IsTouching => listener.on_is_touching(ctx),
            SemanticEvent::StopTouch => listener.on_stop_touch(ctx),
        }
    }
}

impl fmt::Display for SemanticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticEvent::StartClick => "start-click",
            SemanticEvent::IsClicking => "is-clicking",
            SemanticEvent::StopClick => "stop-click",
            SemanticEvent::StartTouch => "start-touch",
            SemanticEvent::IsTouching => "is-touching",
            SemanticEvent::StopTouch => "stop-touch",
        };
        write!(f, "{}", name)
    }
}

pub type SharedListener = Rc<RefCell<dyn FeatureListener>>;

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    listeners: HashMap<InputKey, Vec<(u64, SharedListener)>>,
}

impl RegistryInner {
    fn remove(&mut self, key: &InputKey, id: u64) -> bool {
        let Some(entries) = self.listeners.get_mut(key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.listeners.remove(key);
        }
        removed
    }
}

/// Listener registry keyed by `(hand, button)`
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<L: FeatureListener + 'static>(
        &self,
        hand: Hand,
        button: LogicalButton,
        listener: L,
    ) -> Subscription {
        self.subscribe_shared(hand, button, Rc::new(RefCell::new(listener)))
    }

    /// Subscribes a listener the caller keeps a handle to
    pub fn subscribe_shared(
        &self,
        hand: Hand,
        button: LogicalButton,
        listener: SharedListener,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .listeners
            .entry((hand, button))
            .or_default()
            .push((id, listener));
        debug!("Listener {} subscribed to {} {}", id, hand, button);

        Subscription {
            key: (hand, button),
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self, hand: Hand, button: LogicalButton) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&(hand, button))
            .map_or(0, Vec::len)
    }

    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().listeners.values().map(Vec::len).sum()
    }

    /// Removes every listener; outstanding subscriptions become no-ops
    pub fn clear(&self) {
        self.inner.borrow_mut().listeners.clear();
    }

    /// Delivers one event to every listener of the key
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe from inside a callback. A panicking listener is logged and
    /// skipped; the rest still receive the event. Returns how many listeners
    /// completed the callback.
    pub fn deliver(&self, key: InputKey, event: SemanticEvent, ctx: &EventContext<'_>) -> usize {
        let snapshot: Vec<SharedListener> = match self.inner.borrow().listeners.get(&key) {
            Some(entries) => entries.iter().map(|(_, l)| Rc::clone(l)).collect(),
            None => return 0,
        };

        let mut delivered = 0;
        for listener in snapshot {
            let Ok(mut guard) = listener.try_borrow_mut() else {
                warn!(
                    "Listener for {} {} is busy, skipping {} of {}",
                    key.0, key.1, event, ctx.feature
                );
                continue;
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| event.deliver(&mut *guard, ctx)));
            match result {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    error!(
                        "Listener panicked during {} of {} ({} {}): {}",
                        event,
                        ctx.feature,
                        key.0,
                        key.1,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        delivered
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Scoped registration; dropping it removes the listener
#[must_use = "dropping a subscription unsubscribes the listener"]
#[derive(Debug)]
pub struct Subscription {
    key: InputKey,
    id: u64,
    registry: Weak<RefCell<RegistryInner>>,
}

impl Subscription {
    pub fn key(&self) -> InputKey {
        self.key
    }

    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                if inner.remove(&self.key, self.id) {
                    debug!("Listener {} unsubscribed from {} {}", self.id, self.key.0, self.key.1);
                }
            } else {
                warn!("Registry busy, listener {} could not be removed", self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        starts: usize,
    }

    impl FeatureListener for Counter {
        fn on_start_click(&mut self, _ctx: &EventContext<'_>) {
            self.starts += 1;
        }
    }

    struct Panicker;

    impl FeatureListener for Panicker {
        fn on_start_click(&mut self, _ctx: &EventContext<'_>) {
            panic!("feature bug");
        }
    }

    fn ctx() -> EventContext<'static> {
        EventContext {
            feature: "test",
            hand: Hand::Right,
            button: LogicalButton::Trigger,
            timer_elapsed: None,
            frame: 0,
        }
    }

    #[test]
    fn dropping_the_subscription_unregisters() {
        let registry = ListenerRegistry::new();
        let sub = registry.subscribe(Hand::Right, LogicalButton::Trigger, Counter::default());
        assert_eq!(registry.listener_count(Hand::Right, LogicalButton::Trigger), 1);
        drop(sub);
        assert_eq!(registry.total_listeners(), 0);
    }

    #[test]
    fn explicit_unsubscribe() {
        let registry = ListenerRegistry::new();
        let sub = registry.subscribe(Hand::Left, LogicalButton::Grip, Counter::default());
        assert_eq!(sub.key(), (Hand::Left, LogicalButton::Grip));
        sub.unsubscribe();
        assert_eq!(registry.listener_count(Hand::Left, LogicalButton::Grip), 0);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_others() {
        let registry = ListenerRegistry::new();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let _a = registry.subscribe(Hand::Right, LogicalButton::Trigger, Panicker);
        let _b = registry.subscribe_shared(Hand::Right, LogicalButton::Trigger, counter.clone());

        let delivered = registry.deliver(
            (Hand::Right, LogicalButton::Trigger),
            SemanticEvent::StartClick,
            &ctx(),
        );
        assert_eq!(delivered, 1);
        assert_eq!(counter.borrow().starts, 1);
        assert_eq!(registry.total_listeners(), 2, "panicking listener stays registered");
    }

    #[test]
    fn other_keys_are_not_notified() {
        let registry = ListenerRegistry::new();
        let counter = Rc::new(RefCell::new(Counter::default()));
        let _sub = registry.subscribe_shared(Hand::Left, LogicalButton::Trigger, counter.clone());
        registry.deliver(
            (Hand::Right, LogicalButton::Trigger),
            SemanticEvent::StartClick,
            &ctx(),
        );
        assert_eq!(counter.borrow().starts, 0);
    }
}
