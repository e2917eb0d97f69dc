//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │  drawer  │     │  placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   add_to_cart                        checkout()         │
//! │                   update_cart_item                   clears cart,       │
//! │                   remove_from_cart                   posts success      │
//! │                        │                                  │             │
//! │                        ▼                                  ▼             │
//! │                   clear_cart ─────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use mesa_core::{
    CartChange, CartLine, CartSnapshot, CheckoutTotals, CoreError, MenuItem, Notification,
    NotificationKind,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Cart contents plus a fee preview, returned by every cart command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: CartSnapshot,

    /// Service fee / tax preview at the configured rates.
    pub totals: CheckoutTotals,

    /// What the command changed, if it was a mutation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<CartChange>,
}

impl CartResponse {
    fn build(state: &AppState, cart: CartSnapshot, change: Option<CartChange>) -> Self {
        let totals = CheckoutTotals::compute(cart.subtotal, &state.config.fee_schedule());
        CartResponse {
            cart,
            totals,
            change,
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(state: &AppState) -> CartResponse {
    debug!("get_cart command");
    let cart = state.cart.with_cart(|c| c.snapshot());
    CartResponse::build(state, cart, None)
}

/// Adds an item (default quantity 1), merging with an existing line.
pub fn add_to_cart(
    state: &AppState,
    item: MenuItem,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(item_id = %item.id, quantity, "add_to_cart command");

    let (change, cart) = state.cart.with_cart_mut(|c| {
        let change = c.add_item(&item, quantity)?;
        Ok::<_, CoreError>((change, c.snapshot()))
    })?;

    Ok(CartResponse::build(state, cart, Some(change)))
}

pub fn remove_from_cart(state: &AppState, id: &str) -> CartResponse {
    debug!(item_id = %id, "remove_from_cart command");
    let (change, cart) = state
        .cart
        .with_cart_mut(|c| (c.remove_item(id), c.snapshot()));
    CartResponse::build(state, cart, Some(change))
}

/// Sets a line's quantity; zero or negative removes it.
///
/// ## Errors
/// - `VALIDATION_ERROR` above the per-line quantity cap
pub fn update_cart_item(
    state: &AppState,
    id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(item_id = %id, quantity, "update_cart_item command");
    let (change, cart) = state.cart.with_cart_mut(|c| {
        let change = c.update_quantity(id, quantity)?;
        Ok::<_, CoreError>((change, c.snapshot()))
    })?;
    Ok(CartResponse::build(state, cart, Some(change)))
}

pub fn clear_cart(state: &AppState) -> CartResponse {
    debug!("clear_cart command");
    let (change, cart) = state.cart.with_cart_mut(|c| (c.clear(), c.snapshot()));
    CartResponse::build(state, cart, Some(change))
}

pub fn open_cart(state: &AppState) -> CartResponse {
    let cart = state.cart.with_cart_mut(|c| {
        c.open();
        c.snapshot()
    });
    CartResponse::build(state, cart, None)
}

pub fn close_cart(state: &AppState) -> CartResponse {
    let cart = state.cart.with_cart_mut(|c| {
        c.close();
        c.snapshot()
    });
    CartResponse::build(state, cart, None)
}

pub fn toggle_cart(state: &AppState) -> CartResponse {
    let cart = state.cart.with_cart_mut(|c| {
        c.toggle();
        c.snapshot()
    });
    CartResponse::build(state, cart, None)
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    /// Short human-readable order reference.
    pub order_ref: String,
    pub lines: Vec<CartLine>,
    pub totals: CheckoutTotals,
    pub placed_at: DateTime<Utc>,
    /// The confirmation toast posted for this order.
    pub notification: Notification,
}

/// Places the order: freezes the lines, computes fees, clears the cart
/// and posts a confirmation.
///
/// ## Errors
/// - `CART_ERROR` when the cart is empty
pub fn checkout(state: &AppState) -> Result<CheckoutReceipt, ApiError> {
    let schedule = state.config.fee_schedule();

    let (lines, totals) = state.cart.with_cart_mut(|c| {
        if c.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let totals = CheckoutTotals::compute(c.subtotal(), &schedule);
        let lines = c.lines().to_vec();
        c.clear();
        Ok((lines, totals))
    })?;

    let order_ref = new_order_ref();
    let notification = state.notifications.post_with_defaults(
        NotificationKind::Success,
        "Order placed",
        format!(
            "Order {} confirmed. Total {}",
            order_ref,
            format_amount(&state.config.venue.currency_symbol, totals.total)
        ),
    );

    info!(
        order_ref = %order_ref,
        lines = lines.len(),
        total_cents = totals.total.cents(),
        "Checkout completed"
    );

    Ok(CheckoutReceipt {
        order_ref,
        lines,
        totals,
        placed_at: Utc::now(),
        notification,
    })
}

fn new_order_ref() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

fn format_amount(symbol: &str, amount: mesa_core::Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        symbol,
        amount.dollars().abs(),
        amount.cents_part()
    )
}
