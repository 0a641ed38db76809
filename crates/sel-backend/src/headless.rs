//! In-process backend that tracks surfaces without a compositor.
//!
//! Used when no display server is present and by tests that need to observe
//! what the panel layer asked for.

use crate::{BackendError, PanelBackend, SurfaceKind, SurfaceRect, WindowId};
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

/// Recorded state of a headless surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessSurface {
    pub kind: SurfaceKind,
    pub rect: SurfaceRect,
    pub visible: bool,
    /// Route bound through `load_content`.
    pub content: Option<String>,
    /// Set once an interactive move was started.
    pub moving: bool,
}

/// Headless surface backend.
pub struct HeadlessBackend {
    available: AtomicBool,
    next_id: AtomicU32,
    surfaces: RwLock<HashMap<WindowId, HeadlessSurface>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            next_id: AtomicU32::new(1),
            surfaces: RwLock::new(HashMap::new()),
        }
    }

    /// Toggle availability. While unavailable every request fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of a surface, if it exists.
    pub fn surface(&self, id: WindowId) -> Option<HeadlessSurface> {
        self.surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn ensure_available(&self) -> Result<(), BackendError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(BackendError::Unavailable)
        }
    }

    fn update<F>(&self, id: WindowId, apply: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut HeadlessSurface),
    {
        self.ensure_available()?;
        let mut surfaces = self
            .surfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let surface = surfaces
            .get_mut(&id)
            .ok_or(BackendError::UnknownSurface(id))?;
        apply(surface);
        Ok(())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelBackend for HeadlessBackend {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn create_surface(
        &self,
        kind: SurfaceKind,
        rect: SurfaceRect,
    ) -> Result<WindowId, BackendError> {
        self.ensure_available()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.surfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                HeadlessSurface {
                    kind,
                    rect,
                    visible: false,
                    content: None,
                    moving: false,
                },
            );
        debug!("Headless surface {} created: {:?} {:?}", id, kind, rect);
        Ok(id)
    }

    fn destroy_surface(&self, id: WindowId) -> Result<(), BackendError> {
        self.ensure_available()?;
        self.surfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| debug!("Headless surface {} destroyed", id))
            .ok_or(BackendError::UnknownSurface(id))
    }

    fn show_surface(&self, id: WindowId) -> Result<(), BackendError> {
        self.update(id, |s| s.visible = true)
    }

    fn hide_surface(&self, id: WindowId) -> Result<(), BackendError> {
        self.update(id, |s| {
            s.visible = false;
            s.moving = false;
        })
    }

    fn move_surface(&self, id: WindowId, x: i32, y: i32) -> Result<(), BackendError> {
        self.update(id, |s| {
            s.rect.x = x;
            s.rect.y = y;
        })
    }

    fn load_content(&self, id: WindowId, route: &str) -> Result<(), BackendError> {
        self.update(id, |s| s.content = Some(route.to_string()))
    }

    fn start_moving(&self, id: WindowId) -> Result<(), BackendError> {
        self.update(id, |s| s.moving = true)
    }
}
