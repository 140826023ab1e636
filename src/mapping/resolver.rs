//! Binding resolver
//!
//! Validates a binding configuration against the capability table and the
//! active backend. Runs once per backend activation; failures are returned as
//! [`ConfigError`] and leave the binding inert.

use crate::mapping::binding::BindingConfig;
use crate::mapping::context::EngineContext;
use crate::mapping::error::ConfigError;
use crate::mapping::mapping_types::{
    Backend, Hand, InteractionKind, InteractionType, LogicalButton,
};

/// Outcome of a successful resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub hand: Hand,
    pub button: LogicalButton,
    pub interaction: InteractionType,
    pub backend: Backend,
}

impl ResolvedBinding {
    pub fn key(&self) -> (Hand, LogicalButton) {
        (self.hand, self.button)
    }
}

pub fn resolve(config: &BindingConfig, ctx: &EngineContext) -> Result<ResolvedBinding, ConfigError> {
    let backend = ctx.active_backend();

    if config.interaction.is_empty() {
        return Err(ConfigError::NoInteraction);
    }
    check_value("click_threshold", config.click_threshold, |v| (0.0..=1.0).contains(&v))?;
    check_value("touch_threshold", config.touch_threshold, |v| (0.0..=1.0).contains(&v))?;
    if let Some(policy) = &config.timer_policy {
        check_value("timer duration", policy.duration, |v| v.is_finite() && v > 0.0)?;
    }
    if !config.backend_filter.contains(&backend) {
        return Err(ConfigError::BackendFiltered { backend });
    }

    // Gaze override swaps in the backend's gaze click button
    let gaze = config.gaze_button_override || config.hand == Hand::Gaze;
    let button = if config.gaze_button_override {
        match ctx.gaze_click_button() {
            Some(button) => button,
            None if !ctx.settings().gaze_enabled => return Err(ConfigError::GazeDisabled),
            None => return Err(ConfigError::NoGazeButton { backend }),
        }
    } else {
        config.logical_button
    };
    if gaze && !ctx.settings().gaze_enabled {
        return Err(ConfigError::GazeDisabled);
    }

    let capabilities = ctx
        .capabilities()
        .backend(backend)
        .and_then(|caps| caps.lookup_any_hand(button).map(|any| (caps, any)));
    let (caps, any_hand) = match capabilities {
        Some(found) => found,
        None => {
            return Err(ConfigError::CapabilityMismatch {
                button,
                backend,
                available_on: ctx.capabilities().backends_providing(button),
            })
        }
    };

    let hand = if gaze {
        Hand::Gaze
    } else {
        infer_hand(button, config.hand)?
    };

    let supported = if gaze {
        any_hand
    } else {
        caps.lookup(hand, button)
            .ok_or(ConfigError::NotOnHand {
                button,
                hand,
                backend,
            })?
    };
    if !supported.contains(config.interaction) {
        return Err(ConfigError::InteractionUnsupported {
            button,
            hand,
            backend,
            requested: config.interaction,
            supported,
        });
    }

    if button.is_thumbstick() {
        check_thumb_regions(config)?;
    }

    Ok(ResolvedBinding {
        hand,
        button,
        interaction: config.interaction,
        backend,
    })
}

fn check_value(field: &'static str, value: f32, valid: impl Fn(f32) -> bool) -> Result<(), ConfigError> {
    if valid(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn infer_hand(button: LogicalButton, configured: Hand) -> Result<Hand, ConfigError> {
    match (button.implied_hand(), configured) {
        (Some(implied), Hand::Unset) => Ok(implied),
        (Some(implied), configured) if implied != configured => Err(ConfigError::HandConflict {
            button,
            implied,
            configured,
        }),
        (_, Hand::Unset) => Err(ConfigError::HandRequired { button }),
        (_, configured) => Ok(configured),
    }
}

fn check_thumb_regions(config: &BindingConfig) -> Result<(), ConfigError> {
    if config.click_region.is_none() && config.touch_region.is_none() {
        return Err(ConfigError::NoThumbRegion);
    }
    for kind in [InteractionKind::Click, InteractionKind::Touch] {
        if config.interaction.contains(kind.flag())
            && config.threshold(kind) > 0.0
            && config.region(kind).is_none()
        {
            return Err(ConfigError::ThumbRegionRequired { kind });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineSettings;
    use crate::mapping::mapping_types::ThumbRegion;

    fn ctx_on(backend: Backend) -> EngineContext {
        let mut ctx = EngineContext::default();
        ctx.set_backend(backend);
        ctx
    }

    #[test]
    fn hand_is_inferred_from_face_buttons() {
        let config = BindingConfig::new("jump", LogicalButton::AButton, InteractionType::CLICK);
        let resolved = resolve(&config, &ctx_on(Backend::TetheredA)).unwrap();
        assert_eq!(resolved.hand, Hand::Right);
    }

    #[test]
    fn conflicting_hand_is_rejected() {
        let config = BindingConfig::new("jump", LogicalButton::XButton, InteractionType::CLICK)
            .with_hand(Hand::Right);
        assert!(matches!(
            resolve(&config, &ctx_on(Backend::TetheredA)),
            Err(ConfigError::HandConflict { .. })
        ));
    }

    #[test]
    fn trigger_needs_an_explicit_hand() {
        let config = BindingConfig::new("shoot", LogicalButton::Trigger, InteractionType::CLICK);
        assert_eq!(
            resolve(&config, &ctx_on(Backend::TetheredB)),
            Err(ConfigError::HandRequired {
                button: LogicalButton::Trigger
            })
        );
    }

    #[test]
    fn backend_specific_buttons_name_the_backend() {
        let config = BindingConfig::new("jump", LogicalButton::AButton, InteractionType::CLICK);
        let err = resolve(&config, &ctx_on(Backend::Simulator)).unwrap_err();
        assert!(err.is_capability_mismatch());
        assert_eq!(
            err,
            ConfigError::CapabilityMismatch {
                button: LogicalButton::AButton,
                backend: Backend::Simulator,
                available_on: vec![Backend::TetheredA],
            }
        );
    }

    #[test]
    fn thumbstick_threshold_needs_region() {
        let mut config =
            BindingConfig::new("move", LogicalButton::Thumbstick, InteractionType::TOUCH)
                .with_hand(Hand::Left)
                .with_click_region(ThumbRegion::Up, 0.5);
        config.touch_threshold = 0.4;
        assert_eq!(
            resolve(&config, &ctx_on(Backend::TetheredB)),
            Err(ConfigError::ThumbRegionRequired {
                kind: InteractionKind::Touch
            })
        );

        let unset = BindingConfig::new("move", LogicalButton::Thumbstick, InteractionType::TOUCH)
            .with_hand(Hand::Left);
        assert_eq!(
            resolve(&unset, &ctx_on(Backend::TetheredB)),
            Err(ConfigError::NoThumbRegion)
        );
    }

    #[test]
    fn gaze_override_uses_backend_button() {
        let config = BindingConfig::new("select", LogicalButton::Trigger, InteractionType::CLICK)
            .with_gaze_override();
        let resolved = resolve(&config, &ctx_on(Backend::TetheredB)).unwrap();
        assert_eq!(resolved.hand, Hand::Gaze);
        assert_eq!(resolved.button, LogicalButton::Trigger);

        let resolved = resolve(&config, &ctx_on(Backend::TetheredA)).unwrap();
        assert_eq!(resolved.button, LogicalButton::AButton);
    }

    #[test]
    fn gaze_disabled_makes_gaze_bindings_unusable() {
        let settings = EngineSettings {
            gaze_enabled: false,
            ..EngineSettings::default()
        };
        let ctx = EngineContext::new(settings);
        let config = BindingConfig::new("select", LogicalButton::Trigger, InteractionType::CLICK)
            .with_hand(Hand::Gaze);
        assert_eq!(resolve(&config, &ctx), Err(ConfigError::GazeDisabled));
    }

    #[test]
    fn missing_gaze_button_is_reported() {
        let settings = EngineSettings {
            gaze_click_buttons: Vec::new(),
            ..EngineSettings::default()
        };
        let ctx = EngineContext::new(settings);
        let config = BindingConfig::new("select", LogicalButton::Trigger, InteractionType::CLICK)
            .with_gaze_override();
        assert_eq!(
            resolve(&config, &ctx),
            Err(ConfigError::NoGazeButton {
                backend: Backend::Simulator
            })
        );
    }

    #[test]
    fn unsupported_touch_is_rejected() {
        let config = BindingConfig::new("grab", LogicalButton::Grip, InteractionType::TOUCH)
            .with_hand(Hand::Left);
        assert!(matches!(
            resolve(&config, &ctx_on(Backend::TetheredB)),
            Err(ConfigError::InteractionUnsupported { .. })
        ));
    }

    #[test]
    fn none_interaction_and_bad_thresholds() {
        let none = BindingConfig::new("noop", LogicalButton::Grip, InteractionType::NONE)
            .with_hand(Hand::Left);
        assert_eq!(resolve(&none, &ctx_on(Backend::TetheredB)), Err(ConfigError::NoInteraction));

        let mut bad = BindingConfig::new("grab", LogicalButton::Grip, InteractionType::CLICK)
            .with_hand(Hand::Left);
        bad.click_threshold = 1.5;
        assert!(matches!(
            resolve(&bad, &ctx_on(Backend::TetheredB)),
            Err(ConfigError::InvalidValue { field: "click_threshold", .. })
        ));
    }

    #[test]
    fn backend_filter_excludes_active_backend() {
        let config = BindingConfig::new("grab", LogicalButton::Grip, InteractionType::CLICK)
            .with_hand(Hand::Left)
            .only_on(&[Backend::TetheredA]);
        assert_eq!(
            resolve(&config, &ctx_on(Backend::Simulator)),
            Err(ConfigError::BackendFiltered {
                backend: Backend::Simulator
            })
        );
        assert!(resolve(&config, &ctx_on(Backend::TetheredA)).is_ok());
    }
}
