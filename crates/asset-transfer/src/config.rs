//! # Engine Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ASSET_ADMIN_PRINCIPALS` | `admin,Admin@org1.example.com,Admin@org2.example.com` | Comma-separated admin common names |
//! | `ASSET_USERTYPE_ATTRIBUTE` | `usertype` | Credential attribute carrying the role |
//! | `ASSET_EVENT_NAME` | `chaincodeEvent` | Name of the notification channel |
//! | `ASSET_UTC_OFFSET_SECONDS` | `25200` | Offset for history timestamps (Asia/Jakarta) |

use crate::events::EVENT_NAME;
use chrono::FixedOffset;
use std::env;
use thiserror::Error;

/// Administrative principals recognised without a role attribute.
pub const DEFAULT_ADMIN_PRINCIPALS: [&str; 3] =
    ["admin", "Admin@org1.example.com", "Admin@org2.example.com"];

/// Default credential attribute carrying the caller's role.
pub const DEFAULT_USERTYPE_ATTRIBUTE: &str = "usertype";

/// UTC+07:00.
pub const DEFAULT_UTC_OFFSET_SECONDS: i32 = 7 * 3600;

const MAX_OFFSET_SECONDS: i32 = 86_399;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one admin principal is required")]
    NoAdminPrincipals,

    #[error("UTC offset out of range: {0} seconds")]
    OffsetOutOfRange(i32),

    #[error("event name must not be empty")]
    EmptyEventName,

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Asset engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetConfig {
    /// Common names that always resolve to the admin role.
    pub admin_principals: Vec<String>,
    /// Attribute consulted for every other caller.
    pub usertype_attribute: String,
    /// Channel name for mutation events.
    pub event_name: String,
    /// Offset applied to history timestamps.
    pub utc_offset_seconds: i32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            admin_principals: DEFAULT_ADMIN_PRINCIPALS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            usertype_attribute: DEFAULT_USERTYPE_ATTRIBUTE.to_string(),
            event_name: EVENT_NAME.to_string(),
            utc_offset_seconds: DEFAULT_UTC_OFFSET_SECONDS,
        }
    }
}

impl AssetConfig {
    /// Create configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let admin_principals = match env::var("ASSET_ADMIN_PRINCIPALS") {
            Ok(list) => parse_principals(&list),
            Err(_) => defaults.admin_principals,
        };

        let utc_offset_seconds = match env::var("ASSET_UTC_OFFSET_SECONDS") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "ASSET_UTC_OFFSET_SECONDS",
                value: raw,
            })?,
            Err(_) => defaults.utc_offset_seconds,
        };

        let config = Self {
            admin_principals,
            usertype_attribute: env::var("ASSET_USERTYPE_ATTRIBUTE")
                .unwrap_or(defaults.usertype_attribute),
            event_name: env::var("ASSET_EVENT_NAME").unwrap_or(defaults.event_name),
            utc_offset_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_principals.is_empty() {
            return Err(ConfigError::NoAdminPrincipals);
        }
        if self.utc_offset_seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(ConfigError::OffsetOutOfRange(self.utc_offset_seconds));
        }
        if self.event_name.is_empty() {
            return Err(ConfigError::EmptyEventName);
        }
        Ok(())
    }

    /// The configured offset as a chrono zone.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_seconds)
            .ok_or(ConfigError::OffsetOutOfRange(self.utc_offset_seconds))
    }
}

/// Split a comma-separated principal list, dropping blanks.
#[must_use]
pub fn parse_principals(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
