//! # Checkout Fees
//!
//! Service fee and tax applied on top of the cart subtotal.
//!
//! These are pure percentage functions owned by the checkout surface, not
//! cart state: the cart only knows its subtotal. Rates differ per surface
//! and come from configuration.
//!
//! ```text
//! subtotal ──┬──► × service_fee ──► service_fee ──┐
//!            │                                     ├──► total
//!            └──► × tax ─────────► tax ───────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Rate;
use crate::validation::{validate_rate_bps, ValidationResult};

/// Rates applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FeeSchedule {
    pub service_fee: Rate,
    pub tax: Rate,
}

impl FeeSchedule {
    pub const fn new(service_fee: Rate, tax: Rate) -> Self {
        FeeSchedule { service_fee, tax }
    }

    /// No fees at all.
    pub const fn none() -> Self {
        FeeSchedule {
            service_fee: Rate::zero(),
            tax: Rate::zero(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_rate_bps("service_fee_bps", self.service_fee.bps())?;
        validate_rate_bps("tax_bps", self.tax.bps())
    }
}

impl Default for FeeSchedule {
    /// 10% service fee, 19% tax.
    fn default() -> Self {
        FeeSchedule {
            service_fee: Rate::from_bps(1000),
            tax: Rate::from_bps(1900),
        }
    }
}

/// Payable breakdown for a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub service_fee: Money,
    pub tax: Money,
    pub total: Money,
}

impl CheckoutTotals {
    /// Applies both rates to the subtotal independently and sums.
    ///
    /// ```rust
    /// use mesa_core::{CheckoutTotals, FeeSchedule, Money};
    ///
    /// let totals = CheckoutTotals::compute(Money::from_cents(2550), &FeeSchedule::default());
    /// assert_eq!(totals.service_fee.cents(), 255);
    /// assert_eq!(totals.tax.cents(), 485);
    /// assert_eq!(totals.total.cents(), 3290);
    /// ```
    pub fn compute(subtotal: Money, schedule: &FeeSchedule) -> Self {
        let service_fee = subtotal.apply_rate(schedule.service_fee);
        let tax = subtotal.apply_rate(schedule.tax);

        CheckoutTotals {
            subtotal,
            service_fee,
            tax,
            total: subtotal + service_fee + tax,
        }
    }
}
