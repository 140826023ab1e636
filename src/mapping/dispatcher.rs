//! Event dispatcher - raw signals in, semantic events out
//!
//! Runs once per binding per frame. Each requested interaction is stepped on
//! its own track (threshold, timer gate, hold bookkeeping) and the resulting
//! emissions are delivered in a fixed order:
//!
//! ```text
//! start-touch, start-click, is-touching, is-clicking, stop-click, stop-touch
//! ```

use crate::controller::input_table::ButtonSample;
use crate::mapping::binding::{FeatureBinding, InteractionTrack};
use crate::mapping::listener::{EventContext, ListenerRegistry, SemanticEvent};
use crate::mapping::mapping_types::{InteractionKind, TimerMode};
use tracing::debug;

/// What one track wants delivered this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emissions {
    pub start: bool,
    pub is_interacting: bool,
    pub stop: bool,
}

impl Emissions {
    pub fn is_empty(&self) -> bool {
        !(self.start || self.is_interacting || self.stop)
    }
}

/// Advances one track by a frame given its effective signal
pub fn step_track(track: &mut InteractionTrack, down: bool, delta: f32) -> Emissions {
    let was_down = track.active_above_threshold;
    let started = track.started;
    track.active_above_threshold = down;

    let mut out = Emissions::default();
    match track.gate.as_mut() {
        None => {
            if down {
                out.start = !was_down;
                out.is_interacting = true;
            } else {
                out.stop = was_down && started;
            }
        }
        Some(gate) => {
            gate.begin_frame();
            match (was_down, down) {
                (false, true) => gate.on_press(),
                (true, true) => gate.on_hold(delta),
                (true, false) => {
                    let tap = gate.on_release(delta);
                    if tap {
                        out.start = true;
                        out.stop = true;
                    }
                }
                (false, false) => {}
            }

            if gate.policy().mode == TimerMode::AfterThreshold {
                if down && gate.is_ready() {
                    out.start = !started;
                    out.is_interacting = true;
                }
                if was_down && !down {
                    out.stop = started;
                }
            }
        }
    }

    if out.start {
        track.started = true;
        track.stop_already_fired = false;
    }
    if out.stop {
        if track.stop_already_fired {
            out.stop = false;
        } else {
            track.stop_already_fired = true;
        }
        track.started = false;
    }
    out
}

/// Dispatches one binding for the current frame, returns the number of events emitted
///
/// Unusable or unwired bindings are skipped. A source whose publisher went
/// away is read as released for this frame and then unwired, so any active
/// hold still gets its stop.
pub fn dispatch_binding(
    binding: &mut FeatureBinding,
    registry: &ListenerRegistry,
    delta: f32,
    frame: u64,
) -> usize {
    let Some(resolved) = binding.resolved else {
        return 0;
    };
    let Some(handle) = binding.wiring.as_ref() else {
        return 0;
    };

    let sample = if handle.is_closed() {
        debug!(
            "Raw input for {} {} closed, unwiring {}",
            resolved.hand,
            resolved.button,
            binding.feature()
        );
        binding.wiring = None;
        ButtonSample::released()
    } else {
        handle.sample()
    };

    let mut touch = Emissions::default();
    let mut click = Emissions::default();
    for kind in [InteractionKind::Touch, InteractionKind::Click] {
        if !resolved.interaction.contains(kind.flag()) {
            continue;
        }
        let raw = match kind {
            InteractionKind::Click => sample.click_down,
            InteractionKind::Touch => sample.touch_down,
        };
        let track = binding.track_mut(kind);
        let mut region_exit = None;
        let down = match track.evaluator.as_mut() {
            Some(evaluator) => {
                let outcome = evaluator.evaluate(sample.thumb_position);
                if outcome.just_disengaged {
                    region_exit = Some(evaluator.region());
                }
                raw && outcome.engaged
            }
            None => raw,
        };
        let emitted = step_track(track, down, delta);
        if let Some(region) = region_exit {
            debug!(
                "{} left the {:?} region ({} hold {})",
                binding.feature(),
                region,
                kind,
                if emitted.stop { "stopped" } else { "was not active" }
            );
        }
        match kind {
            InteractionKind::Click => click = emitted,
            InteractionKind::Touch => touch = emitted,
        }
    }

    if touch.is_empty() && click.is_empty() {
        return 0;
    }

    deliver_ordered(binding, registry, frame, touch, click)
}

/// Delivers the stop of every hold the binding still has open
///
/// Called before re-resolution moves the binding off its current source, so
/// listeners on the old pair see each started hold end exactly once.
pub fn release_holds(binding: &mut FeatureBinding, registry: &ListenerRegistry, frame: u64) -> usize {
    if binding.resolved.is_none() {
        return 0;
    }
    let mut touch = Emissions::default();
    let mut click = Emissions::default();
    for kind in [InteractionKind::Touch, InteractionKind::Click] {
        let track = binding.track_mut(kind);
        if !track.started || track.stop_already_fired {
            continue;
        }
        track.started = false;
        track.stop_already_fired = true;
        match kind {
            InteractionKind::Click => click.stop = true,
            InteractionKind::Touch => touch.stop = true,
        }
    }
    if touch.is_empty() && click.is_empty() {
        return 0;
    }
    debug!("Releasing open holds of {} before re-resolution", binding.feature());
    deliver_ordered(binding, registry, frame, touch, click)
}

fn deliver_ordered(
    binding: &FeatureBinding,
    registry: &ListenerRegistry,
    frame: u64,
    touch: Emissions,
    click: Emissions,
) -> usize {
    let Some(resolved) = binding.resolved else {
        return 0;
    };
    let ctx = EventContext {
        feature: binding.feature(),
        hand: resolved.hand,
        button: resolved.button,
        timer_elapsed: binding.timer_elapsed(),
        frame,
    };
    let ordered = [
        (touch.start, SemanticEvent::StartTouch),
        (click.start, SemanticEvent::StartClick),
        (touch.is_interacting, SemanticEvent::IsTouching),
        (click.is_interacting, SemanticEvent::IsClicking),
        (click.stop, SemanticEvent::StopClick),
        (touch.stop, SemanticEvent::StopTouch),
    ];

    let mut emitted = 0;
    for (fire, event) in ordered {
        if fire {
            registry.deliver(resolved.key(), event, &ctx);
            emitted += 1;
        }
    }
    emitted
}
