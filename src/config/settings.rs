use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{CredSwapError, Result};
use crate::usage::claude::{DEFAULT_TIMEOUT_SECS, DEFAULT_USAGE_ENDPOINT};

/// User configuration, loaded from `<data_dir>/credswap.toml`.
///
/// Every field has a sensible default so credswap works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the data dir) holding saved profiles.
    #[serde(default = "default_accounts_dir")]
    pub accounts_dir: String,

    /// Home directory whose live credential files are managed.
    /// Unset means the current user's home.
    #[serde(default)]
    pub home_dir: Option<PathBuf>,

    /// Claude OAuth usage endpoint.
    #[serde(default = "default_usage_endpoint")]
    pub usage_endpoint: String,

    /// Timeout for the usage request, in seconds.
    #[serde(default = "default_usage_timeout_secs")]
    pub usage_timeout_secs: u64,

    /// Record operations in `audit.db`.
    #[serde(default = "default_audit_log")]
    pub audit_log: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_accounts_dir() -> String {
    "accounts".to_string()
}

fn default_usage_endpoint() -> String {
    DEFAULT_USAGE_ENDPOINT.to_string()
}

fn default_usage_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_audit_log() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            accounts_dir: default_accounts_dir(),
            home_dir: None,
            usage_endpoint: default_usage_endpoint(),
            usage_timeout_secs: default_usage_timeout_secs(),
            audit_log: default_audit_log(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the data directory.
    pub const FILE_NAME: &'static str = "credswap.toml";

    /// Load settings from `<data_dir>/credswap.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        toml::from_str(&contents).map_err(|e| {
            CredSwapError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Full path of the accounts directory.
    pub fn accounts_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.accounts_dir)
    }

    pub fn usage_timeout(&self) -> Duration {
        Duration::from_secs(self.usage_timeout_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
