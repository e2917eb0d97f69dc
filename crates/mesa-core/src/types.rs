//! # Domain Types
//!
//! Core domain types shared by the ordering surfaces.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    MenuItem     │──►│    CartLine     │   │    Notification     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │   │  id (unique)    │   │  id (UUID v4)       │   │
//! │  │  name           │   │  quantity >= 1  │   │  kind               │   │
//! │  │  unit_price     │   │  customizations │   │  created_at         │   │
//! │  └─────────────────┘   └─────────────────┘   │  expires_after_ms   │   │
//! │                                              └─────────────────────┘   │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │      Rate       │   │  NotificationKind                        │     │
//! │  │  bps (u32)      │   │  Urgent | Warning | Info | Success       │     │
//! │  │  1000 = 10%     │   └─────────────────────────────────────────┘     │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 1900 bps = 19%.
/// Used for both the service fee and tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// A purchasable item as presented by the menu, before it enters a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    /// Stable item identifier.
    pub id: String,

    pub name: String,

    /// Price per unit in cents. Never negative.
    pub unit_price: Money,

    /// Opaque image reference (URL or asset key).
    #[serde(default)]
    pub image_ref: String,

    /// Chosen customizations, in the order the guest picked them.
    #[serde(default)]
    pub customizations: Vec<String>,

    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl MenuItem {
    /// Creates a plain item with no image, customizations or instructions.
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        MenuItem {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_ref: String::new(),
            customizations: Vec::new(),
            special_instructions: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }

    pub fn with_customization(mut self, customization: impl Into<String>) -> Self {
        self.customizations.push(customization.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(instructions.into());
        self
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One distinct purchasable item and its quantity within a cart.
///
/// ## Design Notes
/// Item data is copied in when the line is created. Re-adding the same id
/// only bumps `quantity`; the first call's metadata wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub unit_price: Money,

    /// Always >= 1 while the line exists.
    pub quantity: i64,

    pub image_ref: String,
    pub customizations: Vec<String>,
    pub special_instructions: Option<String>,
}

impl CartLine {
    /// Creates a line from a menu item and quantity.
    pub fn from_item(item: &MenuItem, quantity: i64) -> Self {
        CartLine {
            id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity,
            image_ref: item.image_ref.clone(),
            customizations: item.customizations.clone(),
            special_instructions: item.special_instructions.clone(),
        }
    }

    /// Extended price: unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Notification Kind
// =============================================================================

/// Severity/category tag of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationKind {
    /// Needs attention now (waiter called, kitchen delay).
    Urgent,
    /// Something is drifting (stock low).
    Warning,
    /// Neutral information (order placed).
    Info,
    /// Positive outcome (order ready, checkout complete).
    Success,
}

impl NotificationKind {
    /// All kinds, most severe first.
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Urgent,
        NotificationKind::Warning,
        NotificationKind::Info,
        NotificationKind::Success,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Urgent => "urgent",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Ok(NotificationKind::Urgent),
            "warning" => Ok(NotificationKind::Warning),
            "info" => Ok(NotificationKind::Info),
            "success" => Ok(NotificationKind::Success),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: NotificationKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Notification
// =============================================================================

/// A button attached to a notification.
///
/// `effect` is an opaque token (`"reorder:tomatoes"`); the composing
/// application decides what it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NotificationAction {
    pub label: String,
    pub effect: String,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, effect: impl Into<String>) -> Self {
        NotificationAction {
            label: label.into(),
            effect: effect.into(),
        }
    }
}

/// A user-facing alert.
///
/// Never mutated after creation; it only leaves the queue by dismissal
/// or expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// `None` means persistent until dismissed.
    pub expires_after_ms: Option<u64>,

    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Returns the expiry delay, if any.
    pub fn expires_after(&self) -> Option<Duration> {
        self.expires_after_ms.map(Duration::from_millis)
    }

    /// Latest instant this notification can still be on screen.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_after_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .map(|ms| self.created_at + chrono::Duration::milliseconds(ms))
    }

    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.expires_after_ms.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
