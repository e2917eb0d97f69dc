//! # mesa-core: Pure Business Logic for Mesa
//!
//! The cart reducer, money math and the shared records that the ordering
//! surfaces render. No I/O, no async, no runtime.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Mesa Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Front-ends (onsite, waiter, chef, manager)        │   │
//! │  │      Menu UI ──► Cart drawer ──► Checkout ──► Toasts            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON-lines IPC                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                      apps/onsite commands                       │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────┐  ┌────────────▼───────────────┐   │
//! │  │   ★ mesa-core (THIS CRATE) ★    │  │   mesa-notify              │   │
//! │  │  money · types · cart · fees    │◄─│   NotificationQueue        │   │
//! │  │  validation · error             │  │   (tokio expiry timers)    │   │
//! │  └─────────────────────────────────┘  └────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` with integer cents
//! - [`types`] - `MenuItem`, `CartLine`, `Notification`, `Rate`
//! - [`cart`] - The `Cart` reducer and its snapshot
//! - [`fees`] - Service fee / tax breakdown at checkout
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use mesa_core::{Cart, CheckoutTotals, FeeSchedule, MenuItem, Money};
//!
//! let mut cart = Cart::new();
//! cart.add_item(&MenuItem::new("A", "Soup", Money::from_cents(1000)), 2).unwrap();
//! cart.add_item(&MenuItem::new("B", "Bread", Money::from_cents(550)), 1).unwrap();
//! assert_eq!(cart.subtotal().to_string(), "$25.50");
//!
//! cart.update_quantity("A", 0).unwrap();
//! assert_eq!(cart.subtotal().to_string(), "$5.50");
//!
//! let totals = CheckoutTotals::compute(cart.subtotal(), &FeeSchedule::default());
//! assert_eq!(totals.total.cents(), 550 + 55 + 105);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod fees;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange, CartSnapshot};
pub use error::{CoreError, CoreResult, ValidationError};
pub use fees::{CheckoutTotals, FeeSchedule};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single cart line.
///
/// Guards against fat-finger orders (1000 instead of 10) and keeps every
/// line total well inside `i64` cents.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default cap on the number of live notifications.
///
/// Long service shifts post hundreds of alerts; beyond this the oldest
/// are dropped.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 50;
