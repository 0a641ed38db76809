//! Panel records and the public panel handle.
//!
//! Every operation validates its arguments first, then resolves the handle
//! and takes the record lock, so calls against one panel are serialized and
//! a destroyed panel is always reported as such.

use crate::error::{Result, SelectionError};
use crate::events::{Listener, ScopeKey};
use crate::registry::PanelHandle;
use crate::session::Session;
use crate::types::{EventInfo, EventType, Geometry, PanelEventInfo, PanelInfo, PanelState, PanelType, Scope};
use crate::validator;
use log::{debug, info};
use sel_backend::WindowId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) type SharedRecord = Arc<Mutex<PanelRecord>>;

/// Mutable state behind a handle.
#[derive(Debug)]
pub(crate) struct PanelRecord {
    pub(crate) panel_type: PanelType,
    pub(crate) state: PanelState,
    pub(crate) geometry: Geometry,
    pub(crate) content: Option<String>,
    pub(crate) window_id: WindowId,
}

impl PanelRecord {
    pub(crate) fn new(info: &PanelInfo, window_id: WindowId) -> Self {
        Self {
            panel_type: info.panel_type,
            state: PanelState::Created,
            geometry: info.geometry(),
            content: None,
            window_id,
        }
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.state == PanelState::Destroyed {
            Err(SelectionError::PanelDestroyed)
        } else {
            Ok(())
        }
    }
}

pub(crate) fn lock(record: &SharedRecord) -> MutexGuard<'_, PanelRecord> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Point-in-time view of a panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub handle: PanelHandle,
    pub panel_type: PanelType,
    pub state: PanelState,
    pub geometry: Geometry,
    pub content: Option<String>,
}

/// Caller-facing handle to a panel. Clones refer to the same panel.
#[derive(Clone)]
pub struct Panel {
    handle: PanelHandle,
    panel_type: PanelType,
    pub(crate) session: Arc<Session>,
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("handle", &self.handle)
            .field("panel_type", &self.panel_type)
            .finish()
    }
}

impl Panel {
    pub(crate) fn new(handle: PanelHandle, panel_type: PanelType, session: Arc<Session>) -> Self {
        Self {
            handle,
            panel_type,
            session,
        }
    }

    pub fn handle(&self) -> PanelHandle {
        self.handle
    }

    pub fn panel_type(&self) -> PanelType {
        self.panel_type
    }

    /// Move the panel to an absolute display position.
    pub async fn move_to(&self, x: i32, y: i32) -> Result<()> {
        validator::position(x, y)?;
        let record = self.session.registry.get(self.handle)?;
        let mut record = lock(&record);
        record.ensure_live()?;
        self.session.backend()?.move_surface(record.window_id, x, y)?;
        record.geometry.x = x;
        record.geometry.y = y;
        debug!("{} moved to ({}, {})", self.handle, x, y);
        Ok(())
    }

    /// Show the panel. Showing a visible panel is a no-op that succeeds.
    pub async fn show(&self) -> Result<()> {
        show_panel(&self.session, self.handle)
    }

    /// Hide the panel and notify `hidden` listeners.
    pub async fn hide(&self) -> Result<()> {
        hide_panel(&self.session, self.handle)
    }

    /// Bind the page at `route` as the panel content.
    pub async fn set_ui_content(&self, route: &str) -> Result<()> {
        validator::route(route)?;
        let record = self.session.registry.get(self.handle)?;
        let mut record = lock(&record);
        record.ensure_live()?;
        self.session
            .backend()?
            .load_content(record.window_id, route)?;
        record.content = Some(route.to_string());
        info!("{} content set to '{}'", self.handle, route);
        Ok(())
    }

    /// Start an interactive drag of the panel.
    pub async fn start_moving(&self) -> Result<()> {
        let record = self.session.registry.get(self.handle)?;
        let record = lock(&record);
        record.ensure_live()?;
        self.session.backend()?.start_moving(record.window_id)?;
        debug!("{} started moving", self.handle);
        Ok(())
    }

    /// Subscribe to `destroyed` or `hidden`.
    pub fn on(&self, event: &str, listener: Listener) -> Result<()> {
        let event = validator::event(Scope::Panel, event)?;
        let record = self.session.registry.get(self.handle)?;
        // Held while registering so a concurrent destroy cannot strand the listener
        let record = lock(&record);
        record.ensure_live()?;
        self.session
            .hub
            .on(ScopeKey::Panel(self.handle), event, listener);
        Ok(())
    }

    /// Unsubscribe one listener, or every listener of `event` when None.
    pub fn off(&self, event: &str, listener: Option<&Listener>) -> Result<()> {
        let event = validator::event(Scope::Panel, event)?;
        let record = self.session.registry.get(self.handle)?;
        let record = lock(&record);
        record.ensure_live()?;
        self.session
            .hub
            .off(ScopeKey::Panel(self.handle), event, listener);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<PanelSnapshot> {
        let record = self.session.registry.get(self.handle)?;
        let record = lock(&record);
        record.ensure_live()?;
        Ok(PanelSnapshot {
            handle: self.handle,
            panel_type: record.panel_type,
            state: record.state,
            geometry: record.geometry,
            content: record.content.clone(),
        })
    }
}

pub(crate) fn show_panel(session: &Session, handle: PanelHandle) -> Result<()> {
    let record = session.registry.get(handle)?;
    let mut record = lock(&record);
    record.ensure_live()?;
    if record.state != PanelState::Shown {
        session.backend()?.show_surface(record.window_id)?;
        record.state = PanelState::Shown;
        info!("{} shown", handle);
    }
    Ok(())
}

pub(crate) fn hide_panel(session: &Session, handle: PanelHandle) -> Result<()> {
    let record = session.registry.get(handle)?;
    let mut record = lock(&record);
    record.ensure_live()?;
    if record.state != PanelState::Hidden {
        session.backend()?.hide_surface(record.window_id)?;
        record.state = PanelState::Hidden;
        info!("{} hidden", handle);
    }
    drop(record);
    session.hub.emit(
        ScopeKey::Panel(handle),
        EventInfo::Panel(PanelEventInfo {
            panel: handle,
            event: EventType::Hidden,
        }),
    );
    Ok(())
}

pub(crate) fn destroy_panel(session: &Session, handle: PanelHandle) -> Result<()> {
    let record = session.registry.get(handle)?;
    let mut record = lock(&record);
    record.ensure_live()?;
    session.backend()?.destroy_surface(record.window_id)?;

    session.registry.remove(handle)?;
    record.state = PanelState::Destroyed;
    session.hub.emit(
        ScopeKey::Panel(handle),
        EventInfo::Panel(PanelEventInfo {
            panel: handle,
            event: EventType::Destroyed,
        }),
    );
    session.hub.clear_panel(handle);
    drop(record);

    info!("{} destroyed", handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::manager::SelectionManager;
    use crate::session::Session;
    use crate::types::{EventInfo, EventType, PanelInfo, PanelState, PanelType, StageContext};
    use crate::Listener;
    use sel_backend::HeadlessBackend;
    use std::sync::{Arc, Mutex};

    async fn setup() -> (SelectionManager, Arc<HeadlessBackend>, crate::Panel) {
        let backend = Arc::new(HeadlessBackend::new());
        let session = Session::builder().backend(backend.clone()).build();
        let manager = SelectionManager::new(session);
        let panel = manager
            .create_panel(
                &StageContext::default(),
                &PanelInfo::new(PanelType::MenuPanel, 0, 0, 100, 100),
            )
            .await
            .unwrap();
        (manager, backend, panel)
    }

    fn recorder(log: &Arc<Mutex<Vec<EventType>>>) -> Listener {
        let log = Arc::clone(log);
        Listener::new(move |info: &EventInfo| log.lock().unwrap().push(info.event()))
    }

    #[tokio::test]
    async fn test_show_hide_transitions() {
        let (_manager, backend, panel) = setup().await;
        assert_eq!(backend.surface_count(), 1);

        panel.show().await.unwrap();
        panel.show().await.unwrap();
        assert_eq!(panel.snapshot().unwrap().state, PanelState::Shown);

        panel.hide().await.unwrap();
        panel.hide().await.unwrap();
        assert_eq!(panel.snapshot().unwrap().state, PanelState::Hidden);

        panel.show().await.unwrap();
        assert_eq!(panel.snapshot().unwrap().state, PanelState::Shown);
    }

    #[tokio::test]
    async fn test_move_and_content_update_record() {
        let (_manager, _backend, panel) = setup().await;
        panel.move_to(20, 20).await.unwrap();
        panel.set_ui_content("pages/index/index").await.unwrap();
        panel.start_moving().await.unwrap();

        let snapshot = panel.snapshot().unwrap();
        assert_eq!((snapshot.geometry.x, snapshot.geometry.y), (20, 20));
        assert_eq!(snapshot.geometry.width, 100);
        assert_eq!(snapshot.content.as_deref(), Some("pages/index/index"));
        assert_eq!(snapshot.state, PanelState::Created);
    }

    #[tokio::test]
    async fn test_bad_arguments_are_parameter_errors() {
        let (_manager, _backend, panel) = setup().await;
        let noop = Listener::new(|_| {});

        assert_eq!(
            panel.move_to(-1, 0).await.unwrap_err().code(),
            ErrorCode::ParameterError
        );
        assert_eq!(
            panel.set_ui_content("").await.unwrap_err().code(),
            ErrorCode::ParameterError
        );
        assert_eq!(
            panel.on("hiddenTest", noop.clone()).unwrap_err().code(),
            ErrorCode::ParameterError
        );
        assert_eq!(
            panel.off("selectionCompleted", None).unwrap_err().code(),
            ErrorCode::ParameterError
        );
        assert_eq!(panel.snapshot().unwrap().geometry.x, 0);
    }

    #[tokio::test]
    async fn test_operations_after_destroy() {
        let (manager, _backend, panel) = setup().await;
        manager.destroy_panel(&panel).await.unwrap();
        let noop = Listener::new(|_| {});

        for code in [
            panel.move_to(20, 20).await.unwrap_err().code(),
            panel.show().await.unwrap_err().code(),
            panel.hide().await.unwrap_err().code(),
            panel.set_ui_content("pages/index/index").await.unwrap_err().code(),
            panel.start_moving().await.unwrap_err().code(),
            panel.on("hidden", noop.clone()).unwrap_err().code(),
            panel.off("hidden", None).unwrap_err().code(),
            panel.off("destroyed", Some(&noop)).unwrap_err().code(),
        ] {
            assert_eq!(code, ErrorCode::InvalidPanelState);
        }
    }

    #[tokio::test]
    async fn test_parameter_error_wins_over_destroyed() {
        let (manager, _backend, panel) = setup().await;
        manager.destroy_panel(&panel).await.unwrap();

        assert_eq!(
            panel.move_to(-5, 3).await.unwrap_err().code(),
            ErrorCode::ParameterError
        );
        assert_eq!(
            panel.set_ui_content("").await.unwrap_err().code(),
            ErrorCode::ParameterError
        );
        assert_eq!(
            panel.on("hiddenTest", Listener::new(|_| {})).unwrap_err().code(),
            ErrorCode::ParameterError
        );
    }

    #[tokio::test]
    async fn test_hidden_fires_once_per_hide() {
        let (manager, _backend, panel) = setup().await;
        let log = Arc::new(Mutex::new(Vec::new()));
        panel.on("hidden", recorder(&log)).unwrap();

        panel.hide().await.unwrap();
        manager.flush().await;
        assert_eq!(*log.lock().unwrap(), vec![EventType::Hidden]);

        panel.off("hidden", None).unwrap();
        panel.hide().await.unwrap();
        manager.flush().await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_destroyed_fires_and_listeners_are_released() {
        let (manager, _backend, panel) = setup().await;
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener = recorder(&log);
        panel.on("destroyed", listener.clone()).unwrap();
        panel.on("hidden", listener).unwrap();

        manager.destroy_panel(&panel).await.unwrap();
        manager.flush().await;

        assert_eq!(*log.lock().unwrap(), vec![EventType::Destroyed]);
        assert_eq!(
            manager.session().hub.listener_count(
                crate::events::ScopeKey::Panel(panel.handle()),
                EventType::Hidden
            ),
            0
        );
    }

    #[tokio::test]
    async fn test_off_unregistered_listener_is_ok() {
        let (_manager, _backend, panel) = setup().await;
        panel.off("destroyed", Some(&Listener::new(|_| {}))).unwrap();
        panel.off("hidden", None).unwrap();
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_state_untouched() {
        let (_manager, backend, panel) = setup().await;
        backend.set_available(false);

        assert_eq!(
            panel.show().await.unwrap_err().code(),
            ErrorCode::SelectionService
        );
        assert_eq!(panel.snapshot().unwrap().state, PanelState::Created);
    }
}
