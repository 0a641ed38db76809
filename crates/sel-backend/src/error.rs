//! Error types for sel-backend

use crate::types::WindowId;

/// Surface backend errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Surface backend unavailable")]
    Unavailable,

    #[error("Unknown surface {0}")]
    UnknownSurface(WindowId),

    #[error("Surface operation failed: {0}")]
    Operation(String),
}
