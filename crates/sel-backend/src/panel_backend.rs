use crate::headless::HeadlessBackend;
use crate::{BackendError, BackendKind, SurfaceKind, SurfaceRect, WindowId};
use log::warn;
use std::sync::Arc;

/// Environment variable that selects the backend.
pub const BACKEND_ENV: &str = "SELPANEL_BACKEND";

/// Trait that all surface backends must implement.
/// This provides a unified interface regardless of the underlying compositor.
pub trait PanelBackend: Send + Sync {
    /// Whether the backend can currently service requests.
    fn is_available(&self) -> bool;

    /// Create a new hidden surface and return its id.
    fn create_surface(&self, kind: SurfaceKind, rect: SurfaceRect)
    -> Result<WindowId, BackendError>;

    /// Tear down a surface. The id is invalid afterwards.
    fn destroy_surface(&self, id: WindowId) -> Result<(), BackendError>;

    fn show_surface(&self, id: WindowId) -> Result<(), BackendError>;

    fn hide_surface(&self, id: WindowId) -> Result<(), BackendError>;

    /// Move a surface to an absolute display position.
    fn move_surface(&self, id: WindowId, x: i32, y: i32) -> Result<(), BackendError>;

    /// Bind the page identified by `route` as the surface content.
    fn load_content(&self, id: WindowId, route: &str) -> Result<(), BackendError>;

    /// Begin an interactive, pointer-driven move of the surface.
    fn start_moving(&self, id: WindowId) -> Result<(), BackendError>;
}

/// Detect the backend from the environment.
pub fn detect_backend() -> BackendKind {
    match std::env::var(BACKEND_ENV) {
        Ok(name) => BackendKind::from_name(&name).unwrap_or_else(|| {
            warn!("Unknown {} value '{}', using headless", BACKEND_ENV, name);
            BackendKind::Headless
        }),
        Err(_) => BackendKind::Headless,
    }
}

/// Create the backend for `kind`.
/// Returns None when no backend should be used.
pub fn create_backend(kind: BackendKind) -> Option<Arc<dyn PanelBackend>> {
    match kind {
        BackendKind::Headless => Some(Arc::new(HeadlessBackend::new())),
        BackendKind::Unavailable => None,
    }
}
