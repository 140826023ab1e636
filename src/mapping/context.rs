//! Engine context - the state every binding consults
//!
//! Owned by the application root and handed to the resolver, the wiring step
//! and the dispatcher by reference. The active backend only changes through
//! [`EngineContext::set_backend`], which bumps a generation counter the engine
//! uses to schedule a full re-resolution pass before the next dispatch.

use crate::config::EngineSettings;
use crate::controller::input_table::RawInputTable;
use crate::mapping::capability::CapabilityTable;
use crate::mapping::mapping_types::{Backend, LogicalButton};
use tracing::info;

#[derive(Debug)]
pub struct EngineContext {
    capabilities: CapabilityTable,
    settings: EngineSettings,
    active_backend: Backend,
    backend_generation: u64,
    input: RawInputTable,
}

impl EngineContext {
    pub fn new(settings: EngineSettings) -> Self {
        let active_backend = settings.initial_backend;
        info!("Creating engine context on backend {}", active_backend);
        Self {
            capabilities: CapabilityTable::default(),
            settings,
            active_backend,
            backend_generation: 0,
            input: RawInputTable::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn active_backend(&self) -> Backend {
        self.active_backend
    }

    pub fn backend_generation(&self) -> u64 {
        self.backend_generation
    }

    pub fn gaze_click_button(&self) -> Option<LogicalButton> {
        self.settings.gaze_click_button_for(self.active_backend)
    }

    /// Switches the backend; a no-op when it is already active
    pub fn set_backend(&mut self, backend: Backend) {
        if backend == self.active_backend {
            return;
        }
        info!("Switching backend {} -> {}", self.active_backend, backend);
        self.active_backend = backend;
        self.backend_generation += 1;
    }

    pub fn input(&self) -> &RawInputTable {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut RawInputTable {
        &mut self.input
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
