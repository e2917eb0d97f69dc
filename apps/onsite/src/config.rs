//! # Onsite Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MESA_VENUE_NAME, MESA_SERVICE_FEE_BPS, MESA_TAX_BPS,               │
//! │     MESA_NOTIFY_CAPACITY                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $MESA_CONFIG, or                                                   │
//! │     ~/.config/onsite/onsite.toml (Linux)                               │
//! │     ~/Library/Application Support/com.mesa.onsite/onsite.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [venue]
//! name = "Trattoria Centrale"
//! currency_symbol = "€"
//!
//! [pricing]
//! service_fee_bps = 1000  # 10%
//! tax_bps = 1900          # 19%
//!
//! [notifications]
//! capacity = 50           # 0 = unbounded
//!
//! [notifications.expiry]
//! urgent_ms = 0
//! warning_ms = 8000
//! ```

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use mesa_core::{FeeSchedule, Rate, ValidationError};
use mesa_notify::config::capacity_from_raw;
use mesa_notify::NotifyConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MESA_CONFIG";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueConfig {
    #[serde(default = "default_venue_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_venue_name() -> String {
    "Mesa Onsite".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for VenueConfig {
    fn default() -> Self {
        VenueConfig {
            name: default_venue_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Checkout rates in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_service_fee_bps")]
    pub service_fee_bps: u32,

    #[serde(default = "default_tax_bps")]
    pub tax_bps: u32,
}

fn default_service_fee_bps() -> u32 {
    1000
}

fn default_tax_bps() -> u32 {
    1900
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            service_fee_bps: default_service_fee_bps(),
            tax_bps: default_tax_bps(),
        }
    }
}

impl PricingConfig {
    pub fn schedule(&self) -> FeeSchedule {
        FeeSchedule::new(Rate::from_bps(self.service_fee_bps), Rate::from_bps(self.tax_bps))
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub venue: VenueConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub notifications: NotifyConfig,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (onsite.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading onsite config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load onsite config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, path: &std::path::Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        info!(?path, "Onsite config saved");
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.venue.name.trim().is_empty() {
            return Err(AppError::InvalidConfig("venue.name must not be empty".into()));
        }

        self.pricing.schedule().validate()?;
        self.notifications.validate()?;

        Ok(())
    }

    /// Fee schedule used at checkout.
    pub fn fee_schedule(&self) -> FeeSchedule {
        self.pricing.schedule()
    }

    fn apply_env_overrides(&mut self) -> AppResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production).
    ///
    /// ## Errors
    /// - `InvalidConfig` when a numeric variable does not parse
    fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("MESA_VENUE_NAME") {
            debug!(name = %name, "Overriding venue name from environment");
            self.venue.name = name;
        }

        if let Some(raw) = lookup("MESA_SERVICE_FEE_BPS") {
            self.pricing.service_fee_bps = parse_env("MESA_SERVICE_FEE_BPS", &raw)?;
        }

        if let Some(raw) = lookup("MESA_TAX_BPS") {
            self.pricing.tax_bps = parse_env("MESA_TAX_BPS", &raw)?;
        }

        // 0 = unbounded, same as the file
        if let Some(raw) = lookup("MESA_NOTIFY_CAPACITY") {
            let capacity = parse_env("MESA_NOTIFY_CAPACITY", &raw)?;
            self.notifications.capacity = capacity_from_raw(capacity);
        }

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "mesa", "onsite")
            .map(|dirs| dirs.config_dir().join("onsite.toml"))
    }
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T, ValidationError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ValidationError::InvalidFormat {
        field: key.to_string(),
        reason: format!("{:?}: {}", raw, e),
    })
}
