//! # Error Types
//!
//! Two layers:
//! - `AppError`: startup failures (config, runtime, I/O). Ends the process.
//! - `ApiError`: what a single command returns to the front-end. Never ends
//!   the session.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front-end                     Rust                                     │
//! │  ─────────                     ────                                     │
//! │  {"command":"addToCart",...}                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  ──►  Result<T, ApiError>                      │  │
//! │  │         │                                                        │  │
//! │  │  CoreError::InvalidQuantity ──► VALIDATION_ERROR ───────────────►│  │
//! │  │  CoreError::EmptyCart ────────► CART_ERROR ─────────────────────►│  │
//! │  │  malformed JSON ──────────────► BAD_REQUEST ────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │  {"id":1,"ok":false,"error":{"code":"VALIDATION_ERROR",...}}           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use mesa_core::{CoreError, ValidationError};
use mesa_notify::NotifyError;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Startup errors
// =============================================================================

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notification queue error: {0}")]
    Notify(#[from] NotifyError),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Command errors
// =============================================================================

/// Error returned from a command.
///
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "Invalid quantity 0: must be between 1 and 999" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request line could not be understood.
    BadRequest,

    /// Input validation failed.
    ValidationError,

    /// Cart operation failed (e.g. checkout of an empty cart).
    CartError,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuantity { .. } => ApiError::validation(err.to_string()),
            CoreError::EmptyCart => ApiError::cart("Cannot check out an empty cart"),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        tracing::error!("Notification queue error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
