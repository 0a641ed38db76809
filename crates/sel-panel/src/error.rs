//! Error types for sel-panel

use sel_backend::BackendError;

/// Numeric codes surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    ParameterError = 401,
    SelectionService = 33_600_001,
    InvalidPanelState = 33_600_002,
    InvalidOperation = 33_600_003,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Selection panel errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Parameter error: {0}")]
    Parameter(String),

    #[error("Selection service error: {0}")]
    Service(#[from] BackendError),

    #[error("Panel has been destroyed")]
    PanelDestroyed,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl SelectionError {
    pub fn param(message: impl Into<String>) -> Self {
        SelectionError::Parameter(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SelectionError::Parameter(_) => ErrorCode::ParameterError,
            SelectionError::Service(_) => ErrorCode::SelectionService,
            SelectionError::PanelDestroyed => ErrorCode::InvalidPanelState,
            SelectionError::InvalidOperation(_) => ErrorCode::InvalidOperation,
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectionError>;
