//! Moving credentials between the live locations and the vault.
//!
//! - `save`: live files → vault profile (sealed when the session is unlocked)
//! - `switch`: vault profile → live files, after backing up the live ones
//! - `delete`: remove a vault profile

use std::fs;
use std::path::PathBuf;

use tracing::info;
use zeroize::Zeroizing;

use crate::errors::{CredSwapError, Result};
use crate::live::{backup_path, LiveLocations};
use crate::session::Session;
use crate::vault::store::write_atomic;
use crate::vault::{ProfileKind, Service, VaultStore};

/// Copies profiles between a [`VaultStore`] and the live files.
#[derive(Debug, Clone, Copy)]
pub struct AccountSwitcher<'a> {
    store: &'a VaultStore,
    live: &'a LiveLocations,
}

impl<'a> AccountSwitcher<'a> {
    pub fn new(store: &'a VaultStore, live: &'a LiveLocations) -> Self {
        Self { store, live }
    }

    /// Saved profile names for `service`.
    pub fn list(&self, service: Service) -> Result<Vec<String>> {
        self.store.list(service)
    }

    /// Save the live credentials of `service` as profile `name`.
    ///
    /// Every live file must exist and parse as JSON before any vault file
    /// is written. The stored blobs hold the exact live text. Returns the
    /// vault paths written.
    pub fn save(&self, session: &Session, service: Service, name: &str) -> Result<Vec<PathBuf>> {
        session.ensure_access()?;

        let mut staged: Vec<(ProfileKind, Zeroizing<String>)> = Vec::new();
        for (kind, path) in self.live.live_targets(service) {
            let missing = || CredSwapError::LiveCredentialNotFound(missing_label(service, kind));
            if !path.is_file() {
                return Err(missing());
            }
            let text = Zeroizing::new(fs::read_to_string(&path)?);
            serde_json::from_str::<serde_json::Value>(&text).map_err(|e| {
                CredSwapError::SerializationError(format!("{}: {e}", path.display()))
            })?;
            staged.push((kind, text));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (kind, text) in &staged {
            written.push(self.store.write_profile(session, service, name, *kind, text)?);
        }

        info!(service = %service, account = %name, "saved live account");
        Ok(written)
    }

    /// Make profile `name` the live login for `service`.
    ///
    /// Existing live files are copied to `<file>.backup` first; then every
    /// vault blob is opened; only when all of them opened are the live
    /// files overwritten. Returns the backups written.
    pub fn switch(&self, session: &Session, service: Service, name: &str) -> Result<Vec<PathBuf>> {
        session.ensure_access()?;

        if !self.store.exists(service, name)? {
            return Err(CredSwapError::AccountNotFound {
                service: service.to_string(),
                name: name.to_string(),
            });
        }

        let targets = self.live.live_targets(service);

        let mut backups = Vec::new();
        for (_, live_path) in &targets {
            if live_path.is_file() {
                let backup = backup_path(live_path);
                let contents = Zeroizing::new(fs::read(live_path)?);
                write_atomic(&backup, &contents)?;
                backups.push(backup);
            }
        }

        let mut restored: Vec<(PathBuf, Zeroizing<String>)> = Vec::with_capacity(targets.len());
        for (kind, live_path) in targets {
            let text = self.store.read_profile(session, service, name, kind)?;
            restored.push((live_path, text));
        }

        for (live_path, text) in &restored {
            write_atomic(live_path, text.as_bytes())?;
        }

        info!(
            service = %service,
            account = %name,
            backups = backups.len(),
            "switched live account"
        );
        Ok(backups)
    }

    /// Delete profile `name`. Fails with `AccountNotFound` if none of its
    /// files existed.
    pub fn delete(&self, service: Service, name: &str) -> Result<()> {
        let removed = self.store.remove_profile(service, name)?;
        if removed == 0 {
            return Err(CredSwapError::AccountNotFound {
                service: service.to_string(),
                name: name.to_string(),
            });
        }
        info!(service = %service, account = %name, files = removed, "deleted account");
        Ok(())
    }
}

fn missing_label(service: Service, kind: ProfileKind) -> String {
    match (service, kind) {
        (Service::Codex, _) => "account".to_string(),
        (_, kind) => kind.label().to_string(),
    }
}
