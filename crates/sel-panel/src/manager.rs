//! Manager facade: panel creation and destruction plus manager-scoped
//! subscriptions.

use crate::error::{Result, SelectionError};
use crate::events::{Listener, ScopeKey};
use crate::panel::{self, Panel, PanelRecord};
use crate::session::Session;
use crate::types::{EventInfo, PanelInfo, PanelType, Scope, SelectionInfo, StageContext};
use crate::validator;
use log::{debug, info, warn};
use std::sync::Arc;

/// Entry point for panel owners. Cheap to clone.
#[derive(Clone)]
pub struct SelectionManager {
    session: Arc<Session>,
}

impl SelectionManager {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Subscribe to `selectionCompleted`.
    pub fn on(&self, event: &str, listener: Listener) -> Result<()> {
        let event = validator::event(Scope::Manager, event)?;
        self.session.ensure_selection_active()?;
        self.session.hub.on(ScopeKey::Manager, event, listener);
        Ok(())
    }

    /// Unsubscribe one listener, or all of them when `listener` is None.
    pub fn off(&self, event: &str, listener: Option<&Listener>) -> Result<()> {
        let event = validator::event(Scope::Manager, event)?;
        self.session.hub.off(ScopeKey::Manager, event, listener);
        Ok(())
    }

    /// Create a panel. It starts hidden, in the Created state.
    pub async fn create_panel(&self, ctx: &StageContext, info: &PanelInfo) -> Result<Panel> {
        validator::context(ctx)?;
        validator::panel_info(info)?;
        self.session.ensure_selection_active()?;

        let window_id = self
            .session
            .backend()?
            .create_surface(info.panel_type.surface_kind(), info.geometry().to_rect())?;
        let handle = self
            .session
            .registry
            .insert(PanelRecord::new(info, window_id));

        info!(
            "{} created: {:?} at ({}, {}) {}x{}",
            handle, info.panel_type, info.x, info.y, info.width, info.height
        );
        Ok(Panel::new(handle, info.panel_type, Arc::clone(&self.session)))
    }

    /// Destroy a panel created by this manager.
    pub async fn destroy_panel(&self, panel: &Panel) -> Result<()> {
        if !Arc::ptr_eq(&panel.session, &self.session) {
            return Err(SelectionError::param("panel was not created by this manager"));
        }
        panel::destroy_panel(&self.session, panel.handle())
    }

    /// Text of the most recent completed selection.
    pub async fn get_selection_content(&self) -> Result<String> {
        self.session.ensure_selection_active()?;
        Ok(self.session.selection_content())
    }

    /// Report a completed selection to `selectionCompleted` listeners.
    pub fn notify_selection(&self, info: SelectionInfo) {
        debug!(
            "Selection completed in {} ({} chars)",
            info.bundle_name,
            info.text.chars().count()
        );
        self.session.set_selection_content(&info.text);
        self.session
            .hub
            .emit(ScopeKey::Manager, EventInfo::Selection(info));
    }

    /// Focus moved away from the selection: hide every menu panel and
    /// destroy every main panel.
    pub async fn dispose(&self) {
        for handle in self.session.registry.handles() {
            let Ok(record) = self.session.registry.get(handle) else {
                continue;
            };
            let panel_type = panel::lock(&record).panel_type;
            drop(record);

            let result = match panel_type {
                PanelType::MenuPanel => panel::hide_panel(&self.session, handle),
                PanelType::MainPanel => panel::destroy_panel(&self.session, handle),
            };
            match result {
                Ok(()) | Err(SelectionError::PanelDestroyed) => {}
                Err(e) => warn!("Failed to dispose {}: {}", handle, e),
            }
        }
    }

    /// Release every listener of the session. Call before dropping the last
    /// manager so listeners that captured it do not keep the session alive.
    pub fn close(&self) {
        self.session.shutdown();
    }

    /// Resolves once every event queued so far has reached its listeners.
    pub async fn flush(&self) {
        self.session.hub.flush().await;
    }

    /// Number of live panels.
    pub fn panel_count(&self) -> usize {
        self.session.registry.len()
    }
}
