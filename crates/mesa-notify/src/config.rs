//! # Notification Configuration
//!
//! Capacity and per-kind default expiry for the queue.
//!
//! ## File Format
//! Embedded in the app's `onsite.toml`:
//! ```toml
//! [notifications]
//! capacity = 50      # 0 = unbounded
//!
//! [notifications.expiry]
//! urgent_ms = 0      # 0 = persistent until dismissed
//! warning_ms = 8000
//! info_ms = 5000
//! success_ms = 3000
//! ```

use std::time::Duration;

use mesa_core::{NotificationKind, DEFAULT_NOTIFICATION_CAPACITY};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NotifyError, NotifyResult};

/// Default expiry per kind, in milliseconds. `0` means persistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindExpiry {
    #[serde(default)]
    pub urgent_ms: u64,

    #[serde(default = "default_warning_ms")]
    pub warning_ms: u64,

    #[serde(default = "default_info_ms")]
    pub info_ms: u64,

    #[serde(default = "default_success_ms")]
    pub success_ms: u64,
}

fn default_warning_ms() -> u64 {
    8000
}

fn default_info_ms() -> u64 {
    5000
}

fn default_success_ms() -> u64 {
    3000
}

impl Default for KindExpiry {
    fn default() -> Self {
        KindExpiry {
            urgent_ms: 0,
            warning_ms: default_warning_ms(),
            info_ms: default_info_ms(),
            success_ms: default_success_ms(),
        }
    }
}

impl KindExpiry {
    /// Default expiry for a kind; `None` for persistent kinds.
    pub fn for_kind(&self, kind: NotificationKind) -> Option<Duration> {
        let ms = match kind {
            NotificationKind::Urgent => self.urgent_ms,
            NotificationKind::Warning => self.warning_ms,
            NotificationKind::Info => self.info_ms,
            NotificationKind::Success => self.success_ms,
        };

        (ms > 0).then(|| Duration::from_millis(ms))
    }
}

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Maximum live notifications; the oldest are evicted beyond it.
    /// `None` means unbounded, written as `capacity = 0` in files.
    #[serde(
        default = "default_capacity",
        serialize_with = "serialize_capacity",
        deserialize_with = "deserialize_capacity"
    )]
    pub capacity: Option<usize>,

    #[serde(default)]
    pub expiry: KindExpiry,
}

fn default_capacity() -> Option<usize> {
    Some(DEFAULT_NOTIFICATION_CAPACITY)
}

fn serialize_capacity<S: Serializer>(capacity: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(capacity.map_or(0, |c| c as u64))
}

fn deserialize_capacity<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
    let raw = usize::deserialize(d)?;
    Ok(capacity_from_raw(raw))
}

/// Maps the on-disk / environment form to a capacity: `0` is unbounded.
pub fn capacity_from_raw(raw: usize) -> Option<usize> {
    (raw != 0).then_some(raw)
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            capacity: default_capacity(),
            expiry: KindExpiry::default(),
        }
    }
}

impl NotifyConfig {
    /// Unbounded queue with default expiries.
    pub fn unbounded() -> Self {
        NotifyConfig {
            capacity: None,
            ..Self::default()
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        NotifyConfig {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> NotifyResult<()> {
        if self.capacity == Some(0) {
            return Err(NotifyError::InvalidConfig(
                "capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expiry() {
        let expiry = KindExpiry::default();
        assert_eq!(expiry.for_kind(NotificationKind::Urgent), None);
        assert_eq!(
            expiry.for_kind(NotificationKind::Warning),
            Some(Duration::from_millis(8000))
        );
        assert_eq!(
            expiry.for_kind(NotificationKind::Info),
            Some(Duration::from_millis(5000))
        );
        assert_eq!(
            expiry.for_kind(NotificationKind::Success),
            Some(Duration::from_millis(3000))
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(NotifyConfig::default().validate().is_ok());
        assert!(NotifyConfig::unbounded().validate().is_ok());
        assert!(NotifyConfig::with_capacity(0).validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: NotifyConfig = toml::from_str(
            r#"
            [expiry]
            warning_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.capacity, Some(DEFAULT_NOTIFICATION_CAPACITY));
        assert_eq!(config.expiry.for_kind(NotificationKind::Warning), None);
        assert_eq!(config.expiry.info_ms, 5000);
    }

    #[test]
    fn test_unbounded_survives_toml_round_trip() {
        let written = toml::to_string(&NotifyConfig::unbounded()).unwrap();
        assert!(written.contains("capacity = 0"));

        let reloaded: NotifyConfig = toml::from_str(&written).unwrap();
        assert_eq!(reloaded.capacity, None);
        assert!(reloaded.validate().is_ok());

        let bounded: NotifyConfig =
            toml::from_str(&toml::to_string(&NotifyConfig::with_capacity(7)).unwrap()).unwrap();
        assert_eq!(bounded.capacity, Some(7));
    }
}
