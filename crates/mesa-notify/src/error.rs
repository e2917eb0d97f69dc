//! # Notify Error Types

use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors raised while building a notification queue.
///
/// Posting, dismissing and clearing never fail; only construction does.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// Expiry timers need a tokio runtime and none was running.
    #[error("Notification queue requires a running tokio runtime")]
    NoRuntime,

    #[error("Invalid notification config: {0}")]
    InvalidConfig(String),
}
