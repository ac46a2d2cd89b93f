//! Application settings loaded from a TOML file.
//!
//! The file is optional. Every field has a default, so a missing file or a missing
//! table yields a working configuration:
//!
//! ```toml
//! [ledger]
//! require_full_total = true
//! share_tolerance = 0.01
//! recent_expense_limit = 5
//!
//! [bot]
//! dev_guild_id = 123456789012345678
//! ```

use crate::core::expense::SharePolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable that overrides the settings file location.
pub const CONFIG_PATH_VAR: &str = "SPLIT_BUDDY_CONFIG";

/// Configuration structure representing the entire settings file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger rules
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Discord bot options
    #[serde(default)]
    pub bot: BotSettings,
}

/// Rules applied when recording expenses and building reports
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Reject expenses whose percentages do not add up to 100
    pub require_full_total: bool,
    /// Allowed distance from 100 when checking the percentage total
    pub share_tolerance: f64,
    /// Number of expenses shown on the dashboard
    pub recent_expense_limit: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            require_full_total: true,
            share_tolerance: 0.01,
            recent_expense_limit: 5,
        }
    }
}

impl LedgerSettings {
    /// Share rules used by `core::expense::create_expense`.
    #[must_use]
    pub const fn share_policy(&self) -> SharePolicy {
        SharePolicy {
            require_full_total: self.require_full_total,
            tolerance: self.share_tolerance,
        }
    }
}

/// Discord-specific options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotSettings {
    /// Register commands in this guild only (faster updates during development)
    pub dev_guild_id: Option<u64>,
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `SPLIT_BUDDY_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error; the defaults are used instead.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());

    if !Path::new(&path).exists() {
        info!("No settings file at {path}, using defaults.");
        return Ok(AppConfig::default());
    }

    load_config(&path)
}
