//! # Notification Commands
//!
//! Thin wrappers over `NotificationQueue` plus the operations-event
//! entry point. Expiry is handled by the queue; the shell only ever
//! sees the list shrink.

use std::time::Duration;

use mesa_core::validation::validate_title;
use mesa_core::{Notification, NotificationAction, NotificationKind};
use mesa_notify::NotificationDraft;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::{OperationsEvent, OperationsSink};
use crate::state::AppState;

/// Arguments for `postNotification`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostNotificationArgs {
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: String,

    /// Milliseconds until auto-dismiss. Absent means persistent unless
    /// `use_default_expiry` is set.
    #[serde(default)]
    pub expires_after_ms: Option<u64>,

    #[serde(default)]
    pub actions: Vec<NotificationAction>,

    /// Use the configured per-kind expiry instead of `expires_after_ms`.
    #[serde(default)]
    pub use_default_expiry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dismissed {
    pub dismissed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cleared {
    pub cleared: usize,
}

/// Lists active notifications, newest first.
pub fn list_notifications(state: &AppState) -> Vec<Notification> {
    state.notifications.snapshot()
}

/// Posts a notification.
///
/// ## Errors
/// - `VALIDATION_ERROR` for an empty or overlong title
pub fn post_notification(
    state: &AppState,
    args: PostNotificationArgs,
) -> Result<Notification, ApiError> {
    validate_title(&args.title)?;
    debug!(kind = %args.kind, title = %args.title, "post_notification command");

    let expires_after = if args.use_default_expiry {
        state.notifications.config().expiry.for_kind(args.kind)
    } else {
        args.expires_after_ms.map(Duration::from_millis)
    };

    let mut draft = NotificationDraft::new(args.kind, args.title, args.message);
    draft.expires_after = expires_after;
    draft.actions = args.actions;

    Ok(state.notifications.post(draft))
}

/// Dismisses one notification. Unknown ids are not an error.
pub fn dismiss_notification(state: &AppState, id: Uuid) -> Dismissed {
    debug!(id = %id, "dismiss_notification command");
    Dismissed {
        dismissed: state.notifications.dismiss(id),
    }
}

pub fn clear_notifications(state: &AppState) -> Cleared {
    debug!("clear_notifications command");
    Cleared {
        cleared: state.notifications.clear(),
    }
}

/// Feeds an operations event through the session's port.
pub fn publish_event(state: &AppState, event: OperationsEvent) -> Notification {
    state.operations.publish(event)
}
