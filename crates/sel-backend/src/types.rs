//! Core types for the surface backend abstraction.

/// Identifier of a surface created by a backend.
pub type WindowId = u32;

/// Backend selected for the current process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Headless,
    Unavailable,
}

impl BackendKind {
    /// Parse a backend name as written in config files or the environment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "headless" => Some(BackendKind::Headless),
            "none" | "off" | "unavailable" => Some(BackendKind::Unavailable),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Headless => write!(f, "Headless"),
            BackendKind::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Kind of surface requested by the panel layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Small floating menu next to the selection.
    Menu,
    /// Larger main panel.
    Main,
}

/// Rectangle in global display coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
