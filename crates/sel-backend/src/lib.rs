//! sel-backend: Surface backend abstraction for selection panels
//!
//! Provides a unified interface for the overlay surfaces behind selection
//! panels. Ships an in-process headless backend; compositor backends plug
//! in through the same trait.

pub mod error;
pub mod headless;
pub mod panel_backend;
pub mod types;

pub use error::BackendError;
pub use headless::{HeadlessBackend, HeadlessSurface};
pub use panel_backend::*;
pub use types::*;
