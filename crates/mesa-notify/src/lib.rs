//! # mesa-notify: Notification Queue
//!
//! Holds the short-lived, newest-first list of user-facing alerts (order
//! placed, stock low, waiter called...) and removes them when they expire.
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   producer ──post()──►  ┌───────────────────────────┐                  │
//! │                         │  NotificationQueue        │──► subscribe()   │
//! │   UI ──dismiss()──────► │  Mutex<entries + timers>  │    QueueEvent    │
//! │   UI ──clear()────────► └─────────────┬─────────────┘                  │
//! │                                       │ one fire-once task per expiry  │
//! │                                       ▼                                 │
//! │                           tokio::time::sleep(d) ──► expire(id)         │
//! │                                                     (no-op if gone)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Posting, dismissing and clearing are synchronous; only expiry runs on
//! the runtime.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use mesa_core::NotificationKind;
//! use mesa_notify::{NotificationDraft, NotificationQueue, NotifyConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let queue = NotificationQueue::new(NotifyConfig::default()).unwrap();
//! let n = queue.post(
//!     NotificationDraft::new(NotificationKind::Warning, "Low Stock", "Tomatoes low")
//!         .expires_after(Duration::from_millis(8000)),
//! );
//! assert_eq!(queue.snapshot()[0].id, n.id);
//!
//! queue.clear();
//! assert!(queue.is_empty());
//! assert_eq!(queue.pending_timers(), 0);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod queue;

pub use config::{KindExpiry, NotifyConfig};
pub use error::{NotifyError, NotifyResult};
pub use queue::{NotificationDraft, NotificationQueue, QueueEvent};
