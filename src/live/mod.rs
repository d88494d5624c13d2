//! The live credential files each tool reads at startup.
//!
//! These files belong to the tools, not to the vault.  credswap only reads
//! them (`save`, `current`, `usage`) and overwrites them (`switch`).

pub mod identity;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{CredSwapError, Result};
use crate::vault::{ProfileKind, Service};

pub use identity::{current_accounts, ActiveAccount, CurrentAccounts};

/// Suffix appended to a live file's path for its single backup copy.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Fixed live-file paths, relative to a home directory.
#[derive(Debug, Clone)]
pub struct LiveLocations {
    home: PathBuf,
}

impl LiveLocations {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Locations under the current user's home directory.
    pub fn from_env() -> Result<Self> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or_else(|| CredSwapError::ConfigError("cannot determine home directory".into()))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn claude_credentials(&self) -> PathBuf {
        self.home.join(".claude").join(".credentials.json")
    }

    pub fn claude_config_primary(&self) -> PathBuf {
        self.home.join(".claude").join(".claude.json")
    }

    pub fn claude_config_fallback(&self) -> PathBuf {
        self.home.join(".claude.json")
    }

    pub fn codex_auth(&self) -> PathBuf {
        self.home.join(".codex").join("auth.json")
    }

    pub fn codex_sessions(&self) -> PathBuf {
        self.home.join(".codex").join("sessions")
    }

    /// The claude config file currently in use.
    ///
    /// The primary location wins only if it parses and has an
    /// `oauthAccount` field; otherwise the fallback is returned, whether or
    /// not it exists.  Re-probed on every call.
    pub fn resolve_claude_config(&self) -> PathBuf {
        let primary = self.claude_config_primary();
        if primary_has_account(&primary) {
            return primary;
        }
        debug!(path = %primary.display(), "primary claude config unusable, using fallback");
        self.claude_config_fallback()
    }

    /// Live file for each blob kind of a service.
    pub fn live_targets(&self, service: Service) -> Vec<(ProfileKind, PathBuf)> {
        match service {
            Service::Claude => vec![
                (ProfileKind::Credentials, self.claude_credentials()),
                (ProfileKind::Config, self.resolve_claude_config()),
            ],
            Service::Codex => vec![(ProfileKind::Auth, self.codex_auth())],
        }
    }
}

/// Where the backup copy of `live` is written.
pub fn backup_path(live: &Path) -> PathBuf {
    let mut name = live.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Read and parse a live JSON file. `None` if missing or unparseable.
pub(crate) fn read_json(path: &Path) -> Option<Value> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn primary_has_account(path: &Path) -> bool {
    read_json(path).is_some_and(|v| v.get("oauthAccount").is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn primary_config_needs_oauth_account() {
        let home = TempDir::new().unwrap();
        let live = LiveLocations::new(home.path());
        fs::create_dir_all(home.path().join(".claude")).unwrap();

        fs::write(live.claude_config_primary(), r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(live.resolve_claude_config(), live.claude_config_fallback());

        fs::write(live.claude_config_primary(), "{broken").unwrap();
        assert_eq!(live.resolve_claude_config(), live.claude_config_fallback());

        fs::write(
            live.claude_config_primary(),
            r#"{"oauthAccount":{"emailAddress":"a@b.c"}}"#,
        )
        .unwrap();
        assert_eq!(live.resolve_claude_config(), live.claude_config_primary());
    }

    #[test]
    fn missing_primary_uses_fallback() {
        let home = TempDir::new().unwrap();
        let live = LiveLocations::new(home.path());
        assert_eq!(live.resolve_claude_config(), home.path().join(".claude.json"));
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/h/.codex/auth.json")),
            PathBuf::from("/h/.codex/auth.json.backup")
        );
    }

    #[test]
    fn targets_per_service() {
        let live = LiveLocations::new("/h");
        assert_eq!(live.live_targets(Service::Claude).len(), 2);
        let codex = live.live_targets(Service::Codex);
        assert_eq!(codex, vec![(ProfileKind::Auth, PathBuf::from("/h/.codex/auth.json"))]);
    }
}
