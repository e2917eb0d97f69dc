//! # Error Types
//!
//! Domain-specific error types for mesa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mesa-core errors (this file)                                          │
//! │  ├── CoreError        - Cart / checkout rule violations                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mesa-notify errors (separate crate)                                   │
//! │  └── NotifyError      - Queue construction / config                    │
//! │                                                                         │
//! │  onsite app errors                                                     │
//! │  └── ApiError         - What the front-end sees (serialized)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only quantities are ever rejected by the cart (`add_item`, and
//! `update_quantity` above the line cap); everything else is total over its
//! input, so the taxonomy stays small.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A line quantity outside `1..=MAX_ITEM_QUANTITY` was requested.
    ///
    /// A local validation failure; retrying without correcting the input
    /// gives the same result.
    #[error(
        "Invalid quantity {requested}: must be between 1 and {}",
        crate::MAX_ITEM_QUANTITY
    )]
    InvalidQuantity { requested: i64 },

    /// Checkout was attempted on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Text that does not parse as the expected type.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
