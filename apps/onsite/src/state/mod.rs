//! # State Module
//!
//! Everything one ordering session owns, built once and passed by
//! reference to every command. There are no ambient globals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           AppState                                      │
//! │                                                                         │
//! │  ┌──────────────┐  ┌───────────────────┐  ┌────────────────┐           │
//! │  │  CartState   │  │ NotificationQueue │  │ OperationsPort │           │
//! │  │  Arc<Mutex<  │  │ (mesa-notify)     │◄─│ external event │           │
//! │  │    Cart>>    │  │                   │  │ producers      │           │
//! │  └──────────────┘  └───────────────────┘  └────────────────┘           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────┐          │
//! │  │  Arc<AppConfig>  (read-only after startup)               │          │
//! │  └──────────────────────────────────────────────────────────┘          │
//! │                                                                         │
//! │  The cart and the queue never call each other; checkout composes them. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

pub use cart::CartState;

use std::sync::Arc;

use mesa_notify::NotificationQueue;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::events::OperationsPort;

#[derive(Debug, Clone)]
pub struct AppState {
    pub cart: CartState,
    pub notifications: NotificationQueue,
    pub operations: OperationsPort,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Builds a fresh session: empty cart, empty queue.
    ///
    /// Must be called from within a tokio runtime (expiry timers).
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let notifications = NotificationQueue::new(config.notifications.clone())?;
        let operations = OperationsPort::new(notifications.clone());

        Ok(AppState {
            cart: CartState::new(),
            notifications,
            operations,
            config: Arc::new(config),
        })
    }
}
