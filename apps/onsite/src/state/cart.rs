//! # Cart State
//!
//! Session-owned wrapper around the `mesa_core::Cart` reducer.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Commands and event producers may run on different runtime workers
//! 2. Only one command should modify the cart at a time
//!
//! The lock is only held for the duration of one reducer call.

use std::sync::{Arc, Mutex, PoisonError};

use mesa_core::Cart;

#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ```rust
    /// use mesa_onsite_lib::state::CartState;
    ///
    /// let state = CartState::new();
    /// let subtotal = state.with_cart(|cart| cart.subtotal());
    /// assert!(subtotal.is_zero());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesa_core::{MenuItem, Money};

    #[test]
    fn test_clones_share_one_cart() {
        let state = CartState::new();
        let other = state.clone();

        state
            .with_cart_mut(|c| c.add_item(&MenuItem::new("A", "Soup", Money::from_cents(1000)), 2))
            .unwrap();

        assert_eq!(other.with_cart(|c| c.subtotal().cents()), 2000);
    }

    #[test]
    fn test_concurrent_adds_merge() {
        let state = CartState::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        state
                            .with_cart_mut(|c| {
                                c.add_item(&MenuItem::new("A", "Soup", Money::from_cents(100)), 1)
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        state.with_cart(|c| {
            assert_eq!(c.item_count(), 1);
            assert_eq!(c.total_quantity(), 200);
            assert_eq!(c.subtotal().cents(), 20_000);
        });
    }
}
