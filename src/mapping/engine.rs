//! BAC engine with statum state machine for the binding lifecycle
//!
//! Owns every feature binding and the listener registry. The application root
//! owns the [`EngineContext`] and hands it to each call.
//!
//! # State Machine
//!
//! ```text
//! Configuring ──► Running ──► Stopped
//!  (register)    (tick, register, deregister)
//! ```
//!
//! # Frame
//!
//! ```text
//! backend changed? ──► invalidate all ──► resolve pending ──► wire pending ──► dispatch
//! ```
//!
//! Every binding is re-resolved before any binding is dispatched, so a frame
//! never mixes bindings resolved against two different backends.

use crate::mapping::binding::{BindingConfig, FeatureBinding};
use crate::mapping::context::EngineContext;
use crate::mapping::dispatcher::{dispatch_binding, release_holds};
use crate::mapping::error::{ConfigError, EngineError};
use crate::mapping::listener::ListenerRegistry;
use crate::mapping::resolver::{resolve, ResolvedBinding};
use crate::mapping::wiring::{wire, WiringStatus};
use statum::{machine, state};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Handle returned by registration, used to deregister the binding again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Summary of one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub backend_changed: bool,
    /// Resolver runs this frame
    pub resolved: usize,
    pub unusable: usize,
    /// Usable bindings still waiting for their raw input
    pub deferred: usize,
    pub events: usize,
}

/// States for the engine lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum BacEngineState {
    Configuring, // Bindings registered, nothing resolved yet
    Running,     // Ticked once per frame
    Stopped,     // Scene unloaded
}

#[machine]
pub struct BacEngine<S: BacEngineState> {
    bindings: BTreeMap<BindingId, FeatureBinding>,
    next_id: u64,
    registry: ListenerRegistry,
    seen_generation: u64,
    frame: u64,
}

impl<S: BacEngineState> BacEngine<S> {
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn binding(&self, id: BindingId) -> Option<&FeatureBinding> {
        self.bindings.get(&id)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &FeatureBinding)> {
        self.bindings.iter().map(|(id, b)| (*id, b))
    }

    pub fn find(&self, feature: &str) -> Option<BindingId> {
        self.bindings
            .iter()
            .find(|(_, b)| b.feature() == feature)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn insert_binding(&mut self, config: BindingConfig) -> Result<BindingId, EngineError> {
        if self.find(&config.feature).is_some() {
            return Err(EngineError::DuplicateFeature(config.feature));
        }
        let id = BindingId(self.next_id);
        self.next_id += 1;
        debug!(
            "Registering binding {} for {} ({} {})",
            id, config.feature, config.hand, config.logical_button
        );
        self.bindings.insert(id, FeatureBinding::new(config));
        Ok(id)
    }

    fn remove_binding(&mut self, id: BindingId) -> Result<FeatureBinding, EngineError> {
        let binding = self
            .bindings
            .remove(&id)
            .ok_or(EngineError::UnknownBinding(id.0))?;
        info!("Deregistered binding {} ({})", id, binding.feature());
        Ok(binding)
    }
}

impl BacEngine<Configuring> {
    pub fn create() -> Self {
        info!("Initializing new BAC engine");
        Self::new(
            BTreeMap::new(),         // bindings
            0,                       // next_id
            ListenerRegistry::new(), // registry
            0,                       // seen_generation
            0,                       // frame
        )
    }

    pub fn register_binding(&mut self, config: BindingConfig) -> Result<BindingId, EngineError> {
        self.insert_binding(config)
    }

    pub fn deregister(&mut self, id: BindingId) -> Result<FeatureBinding, EngineError> {
        self.remove_binding(id)
    }

    /// Resolves every registered binding and starts ticking
    pub fn activate(mut self, ctx: &EngineContext) -> BacEngine<Running> {
        info!(
            "Activating BAC engine with {} bindings on {}",
            self.bindings.len(),
            ctx.active_backend()
        );
        self.seen_generation = ctx.backend_generation();
        let grace = ctx.settings().before_threshold_grace;
        for binding in self.bindings.values_mut() {
            let outcome = resolve_logged(binding, ctx);
            binding.apply_resolution(outcome, grace);
        }
        self.transition()
    }
}

impl BacEngine<Running> {
    /// Registers a binding at runtime; it is resolved on the next tick
    pub fn register_binding(&mut self, config: BindingConfig) -> Result<BindingId, EngineError> {
        self.insert_binding(config)
    }

    /// Drops the binding together with its timer and hold state
    ///
    /// Listeners stay subscribed, they belong to the `(hand, button)` pair.
    pub fn deregister(&mut self, id: BindingId) -> Result<FeatureBinding, EngineError> {
        self.remove_binding(id)
    }

    /// Runs one frame
    pub fn tick(&mut self, ctx: &EngineContext, delta: f32) -> FrameReport {
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };
        let grace = ctx.settings().before_threshold_grace;

        if ctx.backend_generation() != self.seen_generation {
            info!(
                "Backend is now {}, re-resolving {} bindings",
                ctx.active_backend(),
                self.bindings.len()
            );
            self.seen_generation = ctx.backend_generation();
            report.backend_changed = true;
            for binding in self.bindings.values_mut() {
                binding.invalidate();
            }
        }

        for binding in self.bindings.values_mut() {
            if binding.is_awaiting_resolution() {
                let outcome = resolve_logged(binding, ctx);
                if !binding.keeps_source(&outcome) {
                    report.events += release_holds(binding, &self.registry, self.frame);
                }
                binding.apply_resolution(outcome, grace);
                report.resolved += 1;
            }
        }

        for binding in self.bindings.values_mut() {
            if !binding.is_usable() {
                report.unusable += 1;
                continue;
            }
            if wire_binding(binding, ctx) == WiringStatus::Deferred {
                report.deferred += 1;
            }
        }

        for binding in self.bindings.values_mut() {
            report.events += dispatch_binding(binding, &self.registry, delta, self.frame);
        }

        self.frame += 1;
        report
    }

    /// Scene unload: drops every binding and every listener
    pub fn shutdown(mut self) -> BacEngine<Stopped> {
        info!(
            "Shutting down BAC engine after {} frames ({} bindings, {} listeners)",
            self.frame,
            self.bindings.len(),
            self.registry.total_listeners()
        );
        self.bindings.clear();
        self.registry.clear();
        self.transition()
    }
}

impl BacEngine<Stopped> {}

fn resolve_logged(
    binding: &FeatureBinding,
    ctx: &EngineContext,
) -> Result<ResolvedBinding, ConfigError> {
    let outcome = resolve(binding.config(), ctx);
    match &outcome {
        Ok(resolved) => info!(
            "Resolved {} to {} {} ({}) on {}",
            binding.feature(),
            resolved.hand,
            resolved.button,
            resolved.interaction,
            resolved.backend
        ),
        Err(e) => warn!("Binding {} is unusable: {}", binding.feature(), e),
    }
    outcome
}

fn wire_binding(binding: &mut FeatureBinding, ctx: &EngineContext) -> WiringStatus {
    if binding.is_wired() {
        return WiringStatus::Wired;
    }
    let Some(resolved) = binding.resolution() else {
        return WiringStatus::Deferred;
    };
    match wire(resolved, ctx) {
        Some(handle) => {
            binding.wiring = Some(handle);
            WiringStatus::Wired
        }
        None => WiringStatus::Deferred,
    }
}
