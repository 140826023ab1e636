//! Button-Action-Choser (BAC) engine
//!
//! Turns declarative per-feature binding configurations into semantic input
//! events. Every frame the engine resolves pending bindings against the active
//! backend, wires them to the published raw input and dispatches start / is /
//! stop events for click and touch to the subscribed feature listeners.
//!
//! # Pipeline
//!
//! ```text
//! BindingConfig ──► [Resolver] ──► [Wiring] ──► [Threshold] ──► [Timer Gate] ──► Listeners
//!                       ▲              ▲
//!               CapabilityTable   RawInputTable
//! ```

pub mod binding;
pub mod capability;
pub mod context;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod listener;
pub mod mapping_types;
pub mod resolver;
pub mod threshold;
pub mod timer;
pub mod wiring;

// Re-exports for easier access
pub use binding::{BindingConfig, FeatureBinding};
pub use capability::{BackendCapabilities, ButtonCapability, CapabilityTable};
pub use context::EngineContext;
pub use engine::{BacEngine, BacEngineState, BindingId, FrameReport};
pub use error::{ConfigError, EngineError};
pub use listener::{EventContext, FeatureListener, ListenerRegistry, SemanticEvent, Subscription};
pub use mapping_types::{
    Backend, Hand, InputKey, InteractionKind, InteractionType, LogicalButton, ThumbRegion,
    TimerMode, TimerPolicy,
};
pub use resolver::{resolve, ResolvedBinding};
pub use timer::timer_is_ready;
