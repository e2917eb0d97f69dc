//! # Cart
//!
//! The cart reducer: line items, quantity merge/removal and the subtotal.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  Guest Action              Operation               Line Change          │
//! │  ────────────              ─────────               ───────────          │
//! │                                                                         │
//! │  Tap "Add" ──────────────► add_item() ───────────► push or qty += n    │
//! │                                                                         │
//! │  Stepper +/- ────────────► update_quantity() ────► qty = n (n <= 0     │
//! │                                                     removes the line)   │
//! │                                                                         │
//! │  Swipe to delete ────────► remove_item() ────────► retain(id != x)     │
//! │                                                                         │
//! │  Order placed ───────────► clear() ──────────────► lines.clear()       │
//! │                                                                         │
//! │  Cart drawer ────────────► open/close/toggle ────► is_open only        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per item id.
//! - Every line has `1 <= quantity <= MAX_ITEM_QUANTITY`; a line reaching 0
//!   is removed.
//! - `subtotal()` is recomputed from `lines` on every read. Nothing is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, MenuItem};
use crate::validation::{validate_item_id, validate_unit_price};
use crate::MAX_ITEM_QUANTITY;

/// What a mutating cart operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum CartChange {
    /// A new line was inserted.
    Added { id: String, quantity: i64 },
    /// An existing line absorbed more quantity.
    Merged { id: String, quantity: i64 },
    /// A line's quantity was replaced.
    Updated { id: String, quantity: i64 },
    Removed { id: String },
    /// Nothing matched; the cart is untouched.
    Unchanged,
    Cleared { removed: usize },
}

/// The shopping cart for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    is_open: bool,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty, closed cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            is_open: false,
            created_at: Utc::now(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of an item, merging into an existing line with the
    /// same id.
    ///
    /// ## Behavior
    /// - Item already in cart: quantity increases. The existing line keeps
    ///   its customizations and special instructions.
    /// - Item not in cart: a new line is appended.
    ///
    /// ## Errors
    /// - `InvalidQuantity` when `quantity` is outside `1..=MAX_ITEM_QUANTITY`,
    ///   or when merging would push the line past `MAX_ITEM_QUANTITY`
    /// - `Validation` for a blank id or a negative unit price
    ///
    /// ```rust
    /// use mesa_core::{Cart, MenuItem, Money};
    ///
    /// let mut cart = Cart::new();
    /// cart.add_item(&MenuItem::new("A", "Soup", Money::from_cents(1000)), 2).unwrap();
    /// cart.add_item(&MenuItem::new("B", "Bread", Money::from_cents(550)), 1).unwrap();
    /// assert_eq!(cart.subtotal().cents(), 2550);
    /// ```
    pub fn add_item(&mut self, item: &MenuItem, quantity: i64) -> CoreResult<CartChange> {
        check_quantity(quantity)?;
        validate_item_id(&item.id)?;
        validate_unit_price(item.unit_price)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == item.id) {
            let merged = line.quantity + quantity;
            check_quantity(merged)?;
            line.quantity = merged;
            return Ok(CartChange::Merged {
                id: line.id.clone(),
                quantity: line.quantity,
            });
        }

        self.lines.push(CartLine::from_item(item, quantity));
        Ok(CartChange::Added {
            id: item.id.clone(),
            quantity,
        })
    }

    /// Removes the line with this id. Absent ids are a no-op.
    pub fn remove_item(&mut self, id: &str) -> CartChange {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);

        if self.lines.len() == before {
            CartChange::Unchanged
        } else {
            CartChange::Removed { id: id.to_string() }
        }
    }

    /// Replaces a line's quantity.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as `remove_item`
    /// - id present: quantity replaced
    /// - id absent: no-op
    ///
    /// ## Errors
    /// - `InvalidQuantity` when `quantity > MAX_ITEM_QUANTITY`; the cart is
    ///   left untouched
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> CoreResult<CartChange> {
        if quantity <= 0 {
            return Ok(self.remove_item(id));
        }
        check_quantity(quantity)?;

        Ok(match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) => {
                line.quantity = quantity;
                CartChange::Updated {
                    id: line.id.clone(),
                    quantity,
                }
            }
            None => CartChange::Unchanged,
        })
    }

    /// Removes every line, unconditionally.
    pub fn clear(&mut self) -> CartChange {
        let removed = self.lines.len();
        self.lines.clear();
        self.created_at = Utc::now();
        CartChange::Cleared { removed }
    }

    // =========================================================================
    // Visibility (UI flag, no business effect)
    // =========================================================================

    pub fn open(&mut self) -> bool {
        self.is_open = true;
        self.is_open
    }

    pub fn close(&mut self) -> bool {
        self.is_open = false;
        self.is_open
    }

    /// Flips visibility and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ(unit_price × quantity), computed from the current lines.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Read-only projection handed to presentation code.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from(self)
    }
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if (1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CoreError::InvalidQuantity {
            requested: quantity,
        })
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of a cart: `{lines, subtotal, isOpen}` plus counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub item_count: usize,
    pub total_quantity: i64,
    pub is_open: bool,
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        CartSnapshot {
            lines: cart.lines.clone(),
            subtotal: cart.subtotal(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            is_open: cart.is_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn item(id: &str, cents: i64) -> MenuItem {
        MenuItem::new(id, format!("Item {}", id), Money::from_cents(cents))
    }

    /// Recomputes the subtotal independently of `Cart::subtotal`.
    fn expected_subtotal(cart: &Cart) -> i64 {
        cart.lines()
            .iter()
            .map(|l| l.unit_price.cents() * l.quantity)
            .sum()
    }

    #[test]
    fn test_add_then_update_scenario() {
        let mut cart = Cart::new();
        cart.add_item(&item("A", 1000), 2).unwrap();
        cart.add_item(&item("B", 550), 1).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(2550));

        cart.update_quantity("A", 0).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(550));
        let ids: Vec<&str> = cart.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn test_add_same_id_merges() {
        let mut cart = Cart::new();
        let first = cart.add_item(&item("A", 1000), 2).unwrap();
        let second = cart.add_item(&item("A", 1000), 3).unwrap();

        assert_eq!(
            first,
            CartChange::Added {
                id: "A".to_string(),
                quantity: 2
            }
        );
        assert_eq!(
            second,
            CartChange::Merged {
                id: "A".to_string(),
                quantity: 5
            }
        );
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_merge_keeps_original_metadata() {
        let mut cart = Cart::new();
        let plain = item("burger", 1250).with_customization("no onions");
        let spicy = item("burger", 1250)
            .with_customization("extra jalapeños")
            .with_instructions("very spicy");

        cart.add_item(&plain, 1).unwrap();
        cart.add_item(&spicy, 1).unwrap();

        let line = cart.line("burger").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.customizations, vec!["no onions".to_string()]);
        assert!(line.special_instructions.is_none());
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item(&item("A", 1000), 0),
            Err(CoreError::InvalidQuantity { requested: 0 })
        );
        assert_eq!(
            cart.add_item(&item("A", 1000), -3),
            Err(CoreError::InvalidQuantity { requested: -3 })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_huge_quantity_is_rejected_without_touching_subtotal() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item(&item("A", 1000), 10_000_000_000_000_000),
            Err(CoreError::InvalidQuantity {
                requested: 10_000_000_000_000_000
            })
        );
        assert!(cart.is_empty());
        assert!(cart.subtotal().is_zero());

        cart.add_item(&item("A", 1000), 2).unwrap();
        assert_eq!(
            cart.update_quantity("A", i64::MAX),
            Err(CoreError::InvalidQuantity { requested: i64::MAX })
        );
        assert_eq!(cart.line("A").unwrap().quantity, 2);
        assert_eq!(cart.subtotal().cents(), 2000);
    }

    #[test]
    fn test_quantity_cap_applies_to_merged_total() {
        let mut cart = Cart::new();
        cart.add_item(&item("A", 1000), MAX_ITEM_QUANTITY).unwrap();
        assert_eq!(
            cart.add_item(&item("A", 1000), 1),
            Err(CoreError::InvalidQuantity {
                requested: MAX_ITEM_QUANTITY + 1
            })
        );
        assert_eq!(cart.total_quantity(), MAX_ITEM_QUANTITY);

        assert!(cart.update_quantity("A", MAX_ITEM_QUANTITY).is_ok());
        assert!(cart.update_quantity("A", MAX_ITEM_QUANTITY + 1).is_err());
        assert_eq!(
            cart.subtotal().cents(),
            1000 * MAX_ITEM_QUANTITY
        );
    }

    #[test]
    fn test_add_rejects_blank_id_and_negative_price() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(&item(" ", 1000), 1),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(matches!(
            cart.add_item(&item("A", -1), 1),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_zero_and_negative_remove() {
        let mut cart = Cart::new();
        cart.add_item(&item("A", 1000), 2).unwrap();
        cart.add_item(&item("B", 550), 1).unwrap();

        assert_eq!(
            cart.update_quantity("A", 0),
            Ok(CartChange::Removed { id: "A".to_string() })
        );
        assert_eq!(
            cart.update_quantity("B", -1),
            Ok(CartChange::Removed { id: "B".to_string() })
        );
        assert!(cart.line("A").is_none());
        assert!(cart.line("B").is_none());
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut cart = Cart::new();
        cart.add_item(&item("A", 1000), 2).unwrap();

        assert_eq!(
            cart.update_quantity("A", 7),
            Ok(CartChange::Updated {
                id: "A".to_string(),
                quantity: 7
            })
        );
        assert_eq!(cart.subtotal().cents(), 7000);
    }

    #[test]
    fn test_absent_ids_are_noops() {
        let mut cart = Cart::new();
        cart.add_item(&item("A", 1000), 2).unwrap();
        let before = cart.clone();

        assert_eq!(cart.remove_item("missing"), CartChange::Unchanged);
        assert_eq!(cart, before);

        assert_eq!(cart.update_quantity("missing", 4), Ok(CartChange::Unchanged));
        assert_eq!(cart.update_quantity("missing", 0), Ok(CartChange::Unchanged));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        assert_eq!(cart.clear(), CartChange::Cleared { removed: 0 });

        cart.add_item(&item("A", 1000), 2).unwrap();
        cart.add_item(&item("B", 550), 1).unwrap();
        cart.open();

        assert_eq!(cart.clear(), CartChange::Cleared { removed: 2 });
        assert!(cart.lines().is_empty());
        assert!(cart.subtotal().is_zero());
        // Visibility is not business state
        assert!(cart.is_open());
    }

    #[test]
    fn test_visibility_toggles() {
        let mut cart = Cart::new();
        assert!(!cart.is_open());
        assert!(cart.toggle());
        assert!(!cart.toggle());
        assert!(cart.open());
        assert!(cart.open());
        assert!(!cart.close());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal_tracks_every_operation() {
        let mut cart = Cart::new();
        let ops: Vec<Box<dyn Fn(&mut Cart)>> = vec![
            Box::new(|c| {
                c.add_item(&item("A", 1000), 2).unwrap();
            }),
            Box::new(|c| {
                c.add_item(&item("B", 550), 3).unwrap();
            }),
            Box::new(|c| {
                c.add_item(&item("A", 1000), 1).unwrap();
            }),
            Box::new(|c| {
                c.update_quantity("B", 1).unwrap();
            }),
            Box::new(|c| {
                c.add_item(&item("C", 0), 4).unwrap();
            }),
            Box::new(|c| {
                c.remove_item("A");
            }),
            Box::new(|c| {
                c.update_quantity("C", -2).unwrap();
            }),
            Box::new(|c| {
                c.add_item(&item("D", 1999), 1).unwrap();
            }),
        ];

        for op in ops {
            op(&mut cart);
            assert_eq!(cart.subtotal().cents(), expected_subtotal(&cart));
            assert!(cart.lines().iter().all(|l| l.quantity >= 1));
        }
        assert_eq!(cart.subtotal().cents(), 550 + 1999);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        for id in ["C", "A", "B"] {
            cart.add_item(&item(id, 100), 1).unwrap();
        }
        cart.add_item(&item("A", 100), 1).unwrap();

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(&item("A", 1000), 2).unwrap();
        cart.add_item(&item("B", 550), 1).unwrap();
        cart.toggle();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.subtotal.cents(), 2550);
        assert_eq!(snapshot.item_count, 2);
        assert_eq!(snapshot.total_quantity, 3);
        assert!(snapshot.is_open);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["subtotal"], 2550);
        assert_eq!(json["isOpen"], true);
        assert_eq!(json["lines"][0]["unitPrice"], 1000);
    }
}
