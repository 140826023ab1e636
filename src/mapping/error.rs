//! Error definitions for the BAC engine

use crate::mapping::mapping_types::{Backend, Hand, InteractionKind, InteractionType, LogicalButton};
use thiserror::Error;

/// Why a binding could not be resolved for the active backend
///
/// Resolution failures never stop the engine, the binding just stays inert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("interaction type is None, the binding can never emit")]
    NoInteraction,

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("backend {backend} is excluded by the binding's backend filter")]
    BackendFiltered { backend: Backend },

    #[error("gaze is globally disabled")]
    GazeDisabled,

    #[error("no gaze click button configured for backend {backend}")]
    NoGazeButton { backend: Backend },

    #[error("{button} is not available on backend {backend} (available on {available_on:?})")]
    CapabilityMismatch {
        button: LogicalButton,
        backend: Backend,
        available_on: Vec<Backend>,
    },

    #[error("{button} does not exist on the {hand} hand for backend {backend}")]
    NotOnHand {
        button: LogicalButton,
        hand: Hand,
        backend: Backend,
    },

    #[error("{button} on {hand} cannot be {requested} on backend {backend} (supports {supported})")]
    InteractionUnsupported {
        button: LogicalButton,
        hand: Hand,
        backend: Backend,
        requested: InteractionType,
        supported: InteractionType,
    },

    #[error("hand required: {button} implies no side and none was configured")]
    HandRequired { button: LogicalButton },

    #[error("{button} belongs to the {implied} hand, configured hand is {configured}")]
    HandConflict {
        button: LogicalButton,
        implied: Hand,
        configured: Hand,
    },

    #[error("thumbstick {kind} region required")]
    ThumbRegionRequired { kind: InteractionKind },

    #[error("thumbstick binding needs a click or touch region")]
    NoThumbRegion,
}

impl ConfigError {
    /// Capability problems as opposed to mistakes in the binding itself
    pub fn is_capability_mismatch(&self) -> bool {
        matches!(
            self,
            ConfigError::BackendFiltered { .. }
                | ConfigError::CapabilityMismatch { .. }
                | ConfigError::NotOnHand { .. }
                | ConfigError::InteractionUnsupported { .. }
                | ConfigError::NoGazeButton { .. }
        )
    }
}

/// Errors of the engine lifecycle API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown binding id: {0}")]
    UnknownBinding(u64),

    #[error("duplicate feature name: {0}")]
    DuplicateFeature(String),
}
