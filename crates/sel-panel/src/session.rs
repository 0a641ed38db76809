//! The selection session: everything a manager and its panels share.
//!
//! Built explicitly by the process entry point (or a test) and handed to
//! `SelectionManager::new`. Dropping the last reference tears it down.

use crate::config::SessionConfig;
use crate::error::{Result, SelectionError};
use crate::events::EventHub;
use crate::registry::PanelRegistry;
use log::info;
use sel_backend::{BackendError, PanelBackend};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

pub struct Session {
    id: u64,
    pub(crate) registry: PanelRegistry,
    pub(crate) hub: EventHub,
    backend: Option<Arc<dyn PanelBackend>>,
    capabilities: HashSet<String>,
    selection_active: AtomicBool,
    selection_content: RwLock<String>,
}

impl Session {
    pub fn new(config: &SessionConfig, backend: Option<Arc<dyn PanelBackend>>) -> Arc<Self> {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            "Selection session {} started (backend: {}, selection active: {})",
            id,
            if backend.is_some() { "present" } else { "none" },
            config.selection_active
        );
        Arc::new(Self {
            id,
            registry: PanelRegistry::new(id),
            hub: EventHub::new(),
            backend,
            capabilities: config.capabilities.iter().cloned().collect(),
            selection_active: AtomicBool::new(config.selection_active),
            selection_content: RwLock::new(String::new()),
        })
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    /// Whether a platform capability is present.
    pub fn can_i_use(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    /// Mark whether a text-selection session is currently associated with
    /// the caller. Manager operations that need one fail while inactive.
    pub fn set_selection_active(&self, active: bool) {
        if self.selection_active.swap(active, Ordering::SeqCst) != active {
            info!("Selection session {} active: {}", self.id, active);
        }
    }

    pub fn is_selection_active(&self) -> bool {
        self.selection_active.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_selection_active(&self) -> Result<()> {
        if self.is_selection_active() {
            Ok(())
        } else {
            Err(SelectionError::InvalidOperation(
                "no active text-selection session".into(),
            ))
        }
    }

    pub(crate) fn backend(&self) -> Result<&dyn PanelBackend> {
        match &self.backend {
            Some(backend) if backend.is_available() => Ok(backend.as_ref()),
            _ => Err(BackendError::Unavailable.into()),
        }
    }

    pub(crate) fn selection_content(&self) -> String {
        self.selection_content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_selection_content(&self, text: &str) {
        *self
            .selection_content
            .write()
            .unwrap_or_else(PoisonError::into_inner) = text.to_string();
    }

    /// Drop every registered listener, manager and panel scoped.
    /// A listener holding a manager or panel clone keeps the session alive
    /// until this runs.
    pub fn shutdown(&self) {
        let cleared = self.hub.clear_all();
        info!(
            "Selection session {} shut down ({} listener(s) released)",
            self.id, cleared
        );
    }
}

/// Builder for sessions assembled in code rather than from a config file.
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    backend: Option<Arc<dyn PanelBackend>>,
}

impl SessionBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn PanelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn selection_active(mut self, active: bool) -> Self {
        self.config.selection_active = active;
        self
    }

    pub fn build(self) -> Arc<Session> {
        Session::new(&self.config, self.backend)
    }
}
