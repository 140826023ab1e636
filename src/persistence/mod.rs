//! # Persistence Module
//!
//! A binding profile is everything needed to bring an engine up: the engine
//! wide [`EngineSettings`] plus the binding configuration of every feature.
//! Profiles are stored as TOML, one file per profile, under the user's config
//! directory.
//!
//! ## Error Handling Strategy
//! File operations use `color_eyre` for error context. A missing profile is
//! not fatal: [`profile_store::ensure_default_profile`] writes the built-in
//! default so the driver always has something to run.

pub mod profile_store;

use crate::config::EngineSettings;
use crate::mapping::binding::BindingConfig;
use crate::mapping::mapping_types::{
    Backend, Hand, InteractionType, LogicalButton, ThumbRegion, TimerMode, TimerPolicy,
};
use serde::{Deserialize, Serialize};

/// Settings plus bindings, the unit that is saved and loaded
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct BindingProfile {
    #[serde(default)]
    pub settings: EngineSettings,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl BindingProfile {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: BindingConfig) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn binding(&self, feature: &str) -> Option<&BindingConfig> {
        self.bindings.iter().find(|b| b.feature == feature)
    }
}

/// Built-in profile written on first start
///
/// Covers one binding per interesting path: plain buttons on both hands,
/// a gaze click, thumbstick regions with and without a timer, and a face
/// button that only exists on one backend.
pub fn default_profile() -> BindingProfile {
    BindingProfile::new(EngineSettings::default())
        .with_binding(
            BindingConfig::new("grab_left", LogicalButton::Grip, InteractionType::CLICK)
                .with_hand(Hand::Left),
        )
        .with_binding(
            BindingConfig::new("grab_right", LogicalButton::Grip, InteractionType::CLICK)
                .with_hand(Hand::Right),
        )
        .with_binding(
            BindingConfig::new("menu", LogicalButton::Menu, InteractionType::CLICK)
                .with_hand(Hand::Left),
        )
        .with_binding(
            BindingConfig::new("select", LogicalButton::Trigger, InteractionType::CLICK)
                .with_gaze_override(),
        )
        .with_binding(
            BindingConfig::new(
                "teleport",
                LogicalButton::Thumbstick,
                InteractionType::CLICK | InteractionType::TOUCH,
            )
            .with_hand(Hand::Right)
            .with_click_region(ThumbRegion::Up, 0.0)
            .with_touch_region(ThumbRegion::Up, 0.6)
            .with_timer(TimerPolicy {
                duration: 0.5,
                mode: TimerMode::AfterThreshold,
            }),
        )
        .with_binding(
            BindingConfig::new("snap_turn", LogicalButton::Thumbstick, InteractionType::TOUCH)
                .with_hand(Hand::Left)
                .with_touch_region(ThumbRegion::Right, 0.7)
                .with_timer(TimerPolicy {
                    duration: 0.3,
                    mode: TimerMode::BeforeThreshold,
                }),
        )
        .with_binding(
            BindingConfig::new("jump", LogicalButton::AButton, InteractionType::CLICK)
                .only_on(&[Backend::TetheredA]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::context::EngineContext;
    use crate::mapping::resolver::resolve;

    #[test]
    fn default_profile_features_are_unique() {
        let profile = default_profile();
        let mut names: Vec<&str> = profile.bindings.iter().map(|b| b.feature.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), profile.bindings.len());
    }

    #[test]
    fn default_profile_resolves_on_the_simulator() {
        let profile = default_profile();
        let ctx = EngineContext::new(profile.settings.clone());
        let unusable: Vec<&str> = profile
            .bindings
            .iter()
            .filter(|b| resolve(b, &ctx).is_err())
            .map(|b| b.feature.as_str())
            .collect();
        assert_eq!(unusable, vec!["jump"]);
    }
}
