//! Node settings
//!
//! Loaded once at startup from an optional JSON file, then overridden by
//! command-line flags. Immutable afterwards and shared as `Arc<Settings>`.

use crate::core::Amount;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Default API listen port
pub const DEFAULT_API_PORT: u16 = 12391;

/// Default maximum number of results for list endpoints
pub const DEFAULT_API_MAX_RESULTS: usize = 1000;

/// Default online-window length (5 minutes)
pub const DEFAULT_ONLINE_TIMESTAMP_MODULUS_MS: i64 = 5 * 60 * 1000;

/// Default lifetime of an online record (1 hour)
pub const DEFAULT_ONLINE_LIFETIME_MS: i64 = 60 * 60 * 1000;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

/// Node-wide read-only configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Refuse endpoints that are unsafe on a public node
    pub api_restricted: bool,
    pub api_bind: String,
    pub api_port: u16,
    /// Upper bound (and default) for list endpoint limits
    pub api_max_results: usize,
    /// Minimum transaction fee
    pub unit_fee: Amount,
    pub max_transaction_timestamp_future_ms: i64,
    /// How long a transaction stays acceptable after its timestamp
    pub transaction_expiry_ms: i64,
    pub max_unconfirmed_per_account: usize,
    pub online_timestamp_modulus_ms: i64,
    pub online_lifetime_ms: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_restricted: false,
            api_bind: "127.0.0.1".to_string(),
            api_port: DEFAULT_API_PORT,
            api_max_results: DEFAULT_API_MAX_RESULTS,
            unit_fee: Amount::from_units(100_000),
            max_transaction_timestamp_future_ms: DAY_MS,
            transaction_expiry_ms: DAY_MS,
            max_unconfirmed_per_account: 25,
            online_timestamp_modulus_ms: DEFAULT_ONLINE_TIMESTAMP_MODULUS_MS,
            online_lifetime_ms: DEFAULT_ONLINE_LIFETIME_MS,
        }
    }
}

impl Settings {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let file = fs::File::open(path)?;
        let settings: Settings = serde_json::from_reader(BufReader::new(file))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Restricted-mode settings, mostly for tests
    pub fn restricted() -> Self {
        Self {
            api_restricted: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.api_max_results == 0 {
            return Err(SettingsError::Invalid(
                "apiMaxResults",
                "must be greater than zero".to_string(),
            ));
        }
        if self.online_timestamp_modulus_ms <= 0 {
            return Err(SettingsError::Invalid(
                "onlineTimestampModulusMs",
                "must be greater than zero".to_string(),
            ));
        }
        if self.unit_fee.is_negative() {
            return Err(SettingsError::Invalid(
                "unitFee",
                "must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address the API listens on
    pub fn api_listen_address(&self) -> String {
        format!("{}:{}", self.api_bind, self.api_port)
    }
}
