//! Feature bindings - configuration plus per-frame runtime state
//!
//! `BindingConfig` is the declarative, serializable part written by feature
//! authors. `FeatureBinding` wraps it with everything the resolver, the
//! wiring step and the dispatcher keep between frames.

use crate::mapping::error::ConfigError;
use crate::mapping::mapping_types::{
    Backend, Hand, InteractionKind, InteractionType, LogicalButton, ThumbRegion, TimerPolicy,
};
use crate::mapping::resolver::ResolvedBinding;
use crate::mapping::threshold::ThresholdEvaluator;
use crate::mapping::timer::TimerGate;
use crate::mapping::wiring::SourceHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn all_backends() -> BTreeSet<Backend> {
    Backend::ALL.into_iter().collect()
}

/// Declarative association between a feature and the input that drives it
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BindingConfig {
    /// Name of the owning feature, used in diagnostics and event contexts
    pub feature: String,
    pub logical_button: LogicalButton,
    #[serde(default)]
    pub hand: Hand,
    pub interaction: InteractionType,
    #[serde(default)]
    pub click_region: Option<ThumbRegion>,
    #[serde(default)]
    pub touch_region: Option<ThumbRegion>,
    #[serde(default)]
    pub click_threshold: f32,
    #[serde(default)]
    pub touch_threshold: f32,
    #[serde(default = "all_backends")]
    pub backend_filter: BTreeSet<Backend>,
    #[serde(default)]
    pub gaze_button_override: bool,
    #[serde(default)]
    pub timer_policy: Option<TimerPolicy>,
}

impl BindingConfig {
    pub fn new(feature: impl Into<String>, logical_button: LogicalButton, interaction: InteractionType) -> Self {
        Self {
            feature: feature.into(),
            logical_button,
            hand: Hand::Unset,
            interaction,
            click_region: None,
            touch_region: None,
            click_threshold: 0.0,
            touch_threshold: 0.0,
            backend_filter: all_backends(),
            gaze_button_override: false,
            timer_policy: None,
        }
    }

    pub fn with_hand(mut self, hand: Hand) -> Self {
        self.hand = hand;
        self
    }

    pub fn with_click_region(mut self, region: ThumbRegion, threshold: f32) -> Self {
        self.click_region = Some(region);
        self.click_threshold = threshold;
        self
    }

    pub fn with_touch_region(mut self, region: ThumbRegion, threshold: f32) -> Self {
        self.touch_region = Some(region);
        self.touch_threshold = threshold;
        self
    }

    pub fn with_timer(mut self, policy: TimerPolicy) -> Self {
        self.timer_policy = Some(policy);
        self
    }

    pub fn only_on(mut self, backends: &[Backend]) -> Self {
        self.backend_filter = backends.iter().copied().collect();
        self
    }

    pub fn with_gaze_override(mut self) -> Self {
        self.gaze_button_override = true;
        self
    }

    pub fn region(&self, kind: InteractionKind) -> Option<ThumbRegion> {
        match kind {
            InteractionKind::Click => self.click_region,
            InteractionKind::Touch => self.touch_region,
        }
    }

    pub fn threshold(&self, kind: InteractionKind) -> f32 {
        match kind {
            InteractionKind::Click => self.click_threshold,
            InteractionKind::Touch => self.touch_threshold,
        }
    }

    /// Interaction the timer gate applies to: click when requested, touch otherwise
    pub fn gated_kind(&self) -> Option<InteractionKind> {
        self.timer_policy?;
        if self.interaction.contains(InteractionType::CLICK) {
            Some(InteractionKind::Click)
        } else if self.interaction.contains(InteractionType::TOUCH) {
            Some(InteractionKind::Touch)
        } else {
            None
        }
    }
}

/// Runtime state of one event family (click or touch)
#[derive(Clone, Debug, Default)]
pub struct InteractionTrack {
    /// Effective signal of the previous frame
    pub active_above_threshold: bool,
    pub stop_already_fired: bool,
    /// Start delivered for the current hold
    pub started: bool,
    pub evaluator: Option<ThresholdEvaluator>,
    pub gate: Option<TimerGate>,
}

impl InteractionTrack {
    pub fn reset(&mut self) {
        self.active_above_threshold = false;
        self.stop_already_fired = false;
        self.started = false;
        if let Some(evaluator) = &mut self.evaluator {
            evaluator.reset();
        }
        if let Some(gate) = &mut self.gate {
            gate.reset();
        }
    }
}

/// A configured binding and the state it carries between frames
#[derive(Debug)]
pub struct FeatureBinding {
    config: BindingConfig,
    pub(crate) resolved: Option<ResolvedBinding>,
    pub(crate) diagnostic: Option<ConfigError>,
    pub(crate) awaiting_resolution: bool,
    pub(crate) wiring: Option<SourceHandle>,
    pub(crate) click: InteractionTrack,
    pub(crate) touch: InteractionTrack,
}

impl FeatureBinding {
    pub fn new(config: BindingConfig) -> Self {
        Self {
            config,
            resolved: None,
            diagnostic: None,
            awaiting_resolution: true,
            wiring: None,
            click: InteractionTrack::default(),
            touch: InteractionTrack::default(),
        }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn feature(&self) -> &str {
        &self.config.feature
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Usable and resolved coincide: only a successful resolution makes a binding usable
    pub fn is_usable(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn is_wired(&self) -> bool {
        self.wiring.is_some()
    }

    pub fn is_awaiting_resolution(&self) -> bool {
        self.awaiting_resolution
    }

    pub fn resolution(&self) -> Option<&ResolvedBinding> {
        self.resolved.as_ref()
    }

    pub fn diagnostic(&self) -> Option<&ConfigError> {
        self.diagnostic.as_ref()
    }

    /// Hand after resolution, the configured hand otherwise
    pub fn hand(&self) -> Hand {
        self.resolved.as_ref().map(|r| r.hand).unwrap_or(self.config.hand)
    }

    pub fn track(&self, kind: InteractionKind) -> &InteractionTrack {
        match kind {
            InteractionKind::Click => &self.click,
            InteractionKind::Touch => &self.touch,
        }
    }

    pub(crate) fn track_mut(&mut self, kind: InteractionKind) -> &mut InteractionTrack {
        match kind {
            InteractionKind::Click => &mut self.click,
            InteractionKind::Touch => &mut self.touch,
        }
    }

    /// Elapsed time of the binding's timer, if it has one
    pub fn timer_elapsed(&self) -> Option<f32> {
        self.click
            .gate
            .as_ref()
            .or(self.touch.gate.as_ref())
            .map(|g| g.elapsed())
    }

    /// Marks the binding for a full re-resolution at the start of the next frame
    pub fn invalidate(&mut self) {
        self.awaiting_resolution = true;
    }

    /// True when the outcome reads the same pair with the same interactions,
    /// so the running holds and the wiring stay valid
    pub(crate) fn keeps_source(&self, outcome: &Result<ResolvedBinding, ConfigError>) -> bool {
        match (&self.resolved, outcome) {
            (Some(old), Ok(new)) => old.key() == new.key() && old.interaction == new.interaction,
            _ => false,
        }
    }

    /// Applies a resolver outcome and rebuilds the per-frame state
    ///
    /// Hold state survives when the outcome keeps the source. Otherwise the
    /// tracks start over; pending stops must be delivered before this call.
    pub(crate) fn apply_resolution(
        &mut self,
        outcome: Result<ResolvedBinding, ConfigError>,
        before_threshold_grace: f32,
    ) {
        self.awaiting_resolution = false;
        if self.keeps_source(&outcome) {
            self.diagnostic = None;
            self.resolved = outcome.ok();
            return;
        }
        self.wiring = None;
        self.click = InteractionTrack::default();
        self.touch = InteractionTrack::default();

        match outcome {
            Ok(resolved) => {
                for kind in [InteractionKind::Click, InteractionKind::Touch] {
                    if !resolved.interaction.contains(kind.flag()) {
                        continue;
                    }
                    let threshold = self.config.threshold(kind);
                    let evaluator = match self.config.region(kind) {
                        Some(region)
                            if resolved.button.is_thumbstick()
                                && !ThresholdEvaluator::is_bypassed(threshold) =>
                        {
                            Some(ThresholdEvaluator::new(region, threshold))
                        }
                        _ => None,
                    };
                    let gate = match (self.config.gated_kind(), self.config.timer_policy) {
                        (Some(gated), Some(policy)) if gated == kind => {
                            Some(TimerGate::new(policy, before_threshold_grace))
                        }
                        _ => None,
                    };
                    let track = self.track_mut(kind);
                    track.evaluator = evaluator;
                    track.gate = gate;
                }
                self.diagnostic = None;
                self.resolved = Some(resolved);
            }
            Err(e) => {
                self.resolved = None;
                self.diagnostic = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::mapping_types::TimerMode;

    #[test]
    fn defaults_allow_every_backend() {
        let config = BindingConfig::new("menu", LogicalButton::Menu, InteractionType::CLICK);
        assert_eq!(config.backend_filter.len(), 3);
        assert_eq!(config.hand, Hand::Unset);
    }

    #[test]
    fn timer_gates_click_before_touch() {
        let policy = TimerPolicy {
            duration: 0.5,
            mode: TimerMode::AfterThreshold,
        };
        let both = BindingConfig::new(
            "teleport",
            LogicalButton::Trigger,
            InteractionType::CLICK | InteractionType::TOUCH,
        )
        .with_timer(policy);
        assert_eq!(both.gated_kind(), Some(InteractionKind::Click));

        let touch = BindingConfig::new("hover", LogicalButton::Trigger, InteractionType::TOUCH)
            .with_timer(policy);
        assert_eq!(touch.gated_kind(), Some(InteractionKind::Touch));

        let untimed = BindingConfig::new("grab", LogicalButton::Grip, InteractionType::CLICK);
        assert_eq!(untimed.gated_kind(), None);
    }

    #[test]
    fn new_bindings_wait_for_resolution() {
        let binding = FeatureBinding::new(BindingConfig::new(
            "grab",
            LogicalButton::Grip,
            InteractionType::CLICK,
        ));
        assert!(binding.is_awaiting_resolution());
        assert!(!binding.is_usable());
        assert!(!binding.is_wired());
    }

    #[test]
    fn same_pair_resolution_keeps_the_hold() {
        let mut binding = FeatureBinding::new(
            BindingConfig::new("grab", LogicalButton::Grip, InteractionType::CLICK).with_hand(Hand::Left),
        );
        let on = |backend| ResolvedBinding {
            hand: Hand::Left,
            button: LogicalButton::Grip,
            interaction: InteractionType::CLICK,
            backend,
        };
        binding.apply_resolution(Ok(on(Backend::TetheredA)), 0.1);
        binding.click.started = true;
        binding.click.active_above_threshold = true;

        assert!(binding.keeps_source(&Ok(on(Backend::TetheredB))));
        binding.apply_resolution(Ok(on(Backend::TetheredB)), 0.1);
        assert!(binding.track(InteractionKind::Click).started);
        assert_eq!(binding.resolution().map(|r| r.backend), Some(Backend::TetheredB));

        let moved = ResolvedBinding {
            hand: Hand::Right,
            ..on(Backend::TetheredB)
        };
        assert!(!binding.keeps_source(&Ok(moved)));
        assert!(!binding.keeps_source(&Err(ConfigError::NoInteraction)));
        binding.apply_resolution(Err(ConfigError::NoInteraction), 0.1);
        assert!(!binding.track(InteractionKind::Click).started);
        assert!(!binding.is_usable());
    }
}
