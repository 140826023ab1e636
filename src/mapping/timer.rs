//! Timer gate - hold duration filter for a binding's primary interaction
//!
//! AfterThreshold withholds the start until the hold outlasted the duration.
//! BeforeThreshold treats every hold as a pending tap that is delivered on
//! release while the timer is still ready, and dropped once the hold passes
//! `duration + grace`.

use crate::mapping::mapping_types::{TimerMode, TimerPolicy};
use tracing::debug;

/// The single readiness predicate shared by the gate and by listeners
pub fn timer_is_ready(policy: &TimerPolicy, elapsed: f32) -> bool {
    match policy.mode {
        TimerMode::BeforeThreshold => elapsed < policy.duration,
        TimerMode::AfterThreshold => elapsed > policy.duration,
    }
}

/// Per binding stopwatch
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimerState {
    pub elapsed: f32,
    /// Reset requested by a stop, applied at the start of the next frame
    pub pending_reset: bool,
}

#[derive(Clone, Debug)]
pub struct TimerGate {
    policy: TimerPolicy,
    grace: f32,
    state: TimerState,
    pending_tap: bool,
}

impl TimerGate {
    pub fn new(policy: TimerPolicy, grace: f32) -> Self {
        Self {
            policy,
            grace: grace.max(0.0),
            state: TimerState::default(),
            pending_tap: false,
        }
    }

    pub fn policy(&self) -> &TimerPolicy {
        &self.policy
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.state.elapsed
    }

    pub fn is_ready(&self) -> bool {
        timer_is_ready(&self.policy, self.state.elapsed)
    }

    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap
    }

    /// Applies the reset left behind by the previous frame's release
    pub fn begin_frame(&mut self) {
        if self.state.pending_reset {
            self.state.elapsed = 0.0;
            self.state.pending_reset = false;
        }
    }

    pub fn on_press(&mut self) {
        self.state.elapsed = 0.0;
        self.state.pending_reset = false;
        self.pending_tap = self.policy.mode == TimerMode::BeforeThreshold;
    }

    pub fn on_hold(&mut self, delta: f32) {
        self.advance(delta);

        if self.pending_tap && self.state.elapsed >= self.policy.duration + self.grace {
            debug!(
                "Pending tap expired after {:.3}s (window {:.3}s)",
                self.state.elapsed, self.policy.duration
            );
            self.pending_tap = false;
        }
    }

    /// Returns true when a pending tap is delivered by this release
    pub fn on_release(&mut self, delta: f32) -> bool {
        self.advance(delta);
        self.state.pending_reset = true;

        let tap = self.pending_tap && self.is_ready();
        self.pending_tap = false;
        tap
    }

    /// Drops every piece of hold state, used on re-resolution
    pub fn reset(&mut self) {
        self.state = TimerState::default();
        self.pending_tap = false;
    }

    fn advance(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.state.elapsed += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(mode: TimerMode) -> TimerPolicy {
        TimerPolicy {
            duration: 1.0,
            mode,
        }
    }

    #[test]
    fn readiness_predicate() {
        let before = policy(TimerMode::BeforeThreshold);
        let after = policy(TimerMode::AfterThreshold);
        assert!(timer_is_ready(&before, 0.5));
        assert!(!timer_is_ready(&before, 1.0));
        assert!(!timer_is_ready(&after, 1.0));
        assert!(timer_is_ready(&after, 1.01));
    }

    #[test]
    fn reset_is_deferred_by_one_frame() {
        let mut gate = TimerGate::new(policy(TimerMode::AfterThreshold), 0.1);
        gate.on_press();
        gate.on_hold(0.5);
        gate.on_release(0.25);
        assert_eq!(gate.elapsed(), 0.75, "same frame still sees the hold time");
        gate.begin_frame();
        assert_eq!(gate.elapsed(), 0.0);
    }

    #[test]
    fn quick_release_delivers_the_tap() {
        let mut gate = TimerGate::new(policy(TimerMode::BeforeThreshold), 0.1);
        gate.on_press();
        gate.on_hold(0.25);
        assert!(gate.on_release(0.25));
    }

    #[test]
    fn long_hold_expires_the_tap() {
        let mut gate = TimerGate::new(policy(TimerMode::BeforeThreshold), 0.1);
        gate.on_press();
        gate.on_hold(0.5);
        assert!(gate.has_pending_tap());
        gate.on_hold(0.75);
        assert!(!gate.has_pending_tap());
        assert!(!gate.on_release(0.25));
    }

    #[test]
    fn release_inside_grace_but_after_duration_is_not_ready() {
        let mut gate = TimerGate::new(policy(TimerMode::BeforeThreshold), 0.5);
        gate.on_press();
        gate.on_hold(1.0);
        assert!(gate.has_pending_tap());
        assert!(!gate.on_release(0.25));
    }
}
