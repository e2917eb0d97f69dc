//! # Operations Events
//!
//! The inbound port for restaurant-side happenings. An order-management
//! or stock system calls `publish`; each event becomes one notification.
//!
//! ## Event → Notification
//! ```text
//! ┌───────────────────┬──────────┬──────────────────────────────────────┐
//! │ Event             │ Kind     │ Action                               │
//! ├───────────────────┼──────────┼──────────────────────────────────────┤
//! │ OrderPlaced       │ info     │ View order   → open-order:<ref>      │
//! │ OrderReady        │ success  │ Mark served  → serve:<ref>           │
//! │ StockLow          │ warning  │ Reorder      → reorder:<item>        │
//! │ KitchenDelay      │ urgent   │ Notify guest → notify-guest:<ref>    │
//! │ WaiterCalled      │ urgent   │ Acknowledge  → acknowledge:<table>   │
//! └───────────────────┴──────────┴──────────────────────────────────────┘
//! ```
//! Expiry comes from the per-kind defaults in `NotifyConfig`.

use mesa_core::{Notification, NotificationKind};
use mesa_notify::{KindExpiry, NotificationDraft, NotificationQueue};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Something that happened on the floor or in the kitchen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OperationsEvent {
    #[serde(rename_all = "camelCase")]
    OrderPlaced {
        order_ref: String,
        #[serde(default)]
        table: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    OrderReady {
        order_ref: String,
        #[serde(default)]
        table: Option<String>,
    },

    StockLow { item: String, remaining: u32 },

    #[serde(rename_all = "camelCase")]
    KitchenDelay { order_ref: String, minutes: u32 },

    WaiterCalled { table: String },
}

impl OperationsEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            OperationsEvent::OrderPlaced { .. } => NotificationKind::Info,
            OperationsEvent::OrderReady { .. } => NotificationKind::Success,
            OperationsEvent::StockLow { .. } => NotificationKind::Warning,
            OperationsEvent::KitchenDelay { .. } | OperationsEvent::WaiterCalled { .. } => {
                NotificationKind::Urgent
            }
        }
    }

    /// Renders the event as a notification draft.
    pub fn to_draft(&self, expiry: &KindExpiry) -> NotificationDraft {
        let kind = self.kind();

        let draft = match self {
            OperationsEvent::OrderPlaced { order_ref, table } => NotificationDraft::new(
                kind,
                "New order",
                format!("Order {} placed{}", order_ref, for_table(table)),
            )
            .action("View order", format!("open-order:{}", order_ref)),

            OperationsEvent::OrderReady { order_ref, table } => NotificationDraft::new(
                kind,
                "Order ready",
                format!("Order {} is ready{}", order_ref, for_table(table)),
            )
            .action("Mark served", format!("serve:{}", order_ref)),

            OperationsEvent::StockLow { item, remaining } => NotificationDraft::new(
                kind,
                "Low stock",
                format!("{}: {} left", item, remaining),
            )
            .action("Reorder", format!("reorder:{}", item)),

            OperationsEvent::KitchenDelay { order_ref, minutes } => NotificationDraft::new(
                kind,
                "Kitchen delay",
                format!("Order {} delayed by {} min", order_ref, minutes),
            )
            .action("Notify guest", format!("notify-guest:{}", order_ref)),

            OperationsEvent::WaiterCalled { table } => NotificationDraft::new(
                kind,
                "Waiter called",
                format!("Table {} needs assistance", table),
            )
            .action("Acknowledge", format!("acknowledge:{}", table)),
        };

        match expiry.for_kind(kind) {
            Some(delay) => draft.expires_after(delay),
            None => draft.persistent(),
        }
    }
}

fn for_table(table: &Option<String>) -> String {
    table
        .as_deref()
        .map(|t| format!(" for table {}", t))
        .unwrap_or_default()
}

/// Anything that accepts operations events.
pub trait OperationsSink: Send + Sync {
    fn publish(&self, event: OperationsEvent) -> Notification;
}

/// Port backed by the session's notification queue.
#[derive(Debug, Clone)]
pub struct OperationsPort {
    queue: NotificationQueue,
}

impl OperationsPort {
    pub fn new(queue: NotificationQueue) -> Self {
        OperationsPort { queue }
    }
}

impl OperationsSink for OperationsPort {
    fn publish(&self, event: OperationsEvent) -> Notification {
        let draft = event.to_draft(&self.queue.config().expiry);
        let notification = self.queue.post(draft);

        info!(
            id = %notification.id,
            kind = %notification.kind,
            event = ?event,
            "Operations event published"
        );
        notification
    }
}
