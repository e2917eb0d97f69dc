//! # Validation Module
//!
//! Input validation shared by the cart, the fee schedule and the app's
//! command layer.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Front-end (TypeScript)                                       │
//! │  ├── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: IPC bridge (Rust)                                            │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart reducer                                                 │
//! │  └── Quantity rules (InvalidQuantity)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted notification title.
pub const MAX_TITLE_LEN: usize = 120;

/// 100% in basis points.
pub const MAX_RATE_BPS: u32 = 10_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a menu item id.
///
/// ```rust
/// use mesa_core::validation::validate_item_id;
///
/// assert!(validate_item_id("burger").is_ok());
/// assert!(validate_item_id("  ").is_err());
/// ```
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a notification title: non-blank, at most 120 characters.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price. Zero is allowed (complimentary items).
///
/// ```rust
/// use mesa_core::money::Money;
/// use mesa_core::validation::validate_unit_price;
///
/// assert!(validate_unit_price(Money::from_cents(0)).is_ok());
/// assert!(validate_unit_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a percentage in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > MAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_RATE_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
