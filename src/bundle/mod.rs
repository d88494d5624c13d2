//! Export/import of every saved profile as a single JSON document.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "exportDate": "2025-01-01T00:00:00Z",
//!   "isEncrypted": true,
//!   "claude": { "<name>": { "credentials": {..}, "config": {..} } },
//!   "codex":  { "<name>": { "auth": {..} } }
//! }
//! ```
//!
//! Stored files are embedded as they are on disk, so a bundle from a
//! protected vault carries envelopes, never plaintext.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::crypto::envelope::{self, StoredBlob};
use crate::errors::{CredSwapError, Result};
use crate::session::Session;
use crate::vault::{ProfileKind, Service, VaultStore};

/// Bundle format version written by export.
pub const BUNDLE_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,

    /// Whether the exporting session was unlocked.
    #[serde(default)]
    pub is_encrypted: bool,

    pub claude: BTreeMap<String, ClaudeEntry>,
    pub codex: BTreeMap<String, CodexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeEntry {
    pub credentials: Value,
    pub config: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodexEntry {
    pub auth: Value,
}

/// Number of profiles imported per service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub claude: usize,
    pub codex: usize,
}

impl ExportBundle {
    /// Parse and validate a bundle document.
    ///
    /// `version` must be a non-empty string and `claude`/`codex` must be
    /// present; anything else is `InvalidBundle`.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CredSwapError::InvalidBundle(format!("not JSON: {e}")))?;

        let has_version = value
            .get("version")
            .and_then(Value::as_str)
            .is_some_and(|v| !v.is_empty());
        if !has_version {
            return Err(CredSwapError::InvalidBundle("missing version".into()));
        }
        for section in ["claude", "codex"] {
            if !value.get(section).is_some_and(Value::is_object) {
                return Err(CredSwapError::InvalidBundle(format!("missing {section}")));
            }
        }

        serde_json::from_value(value).map_err(|e| CredSwapError::InvalidBundle(e.to_string()))
    }

    /// Pretty JSON form written to disk.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CredSwapError::SerializationError(format!("bundle: {e}")))
    }

    /// Total number of profiles in the bundle.
    pub fn len(&self) -> usize {
        self.claude.len() + self.codex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default export file name for `date`: `accounts-backup-YYYY-MM-DD.json`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("accounts-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Collect every saved profile into a bundle.
///
/// Claude profiles missing either file are left out.
pub fn export_bundle(store: &VaultStore, session: &Session) -> Result<ExportBundle> {
    session.ensure_access()?;

    let mut claude = BTreeMap::new();
    for name in store.list(Service::Claude)? {
        if !store.exists(Service::Claude, &name)? {
            warn!(account = %name, "skipping incomplete claude profile");
            continue;
        }
        let credentials = stored_value(store, Service::Claude, &name, ProfileKind::Credentials)?;
        let config = stored_value(store, Service::Claude, &name, ProfileKind::Config)?;
        claude.insert(name, ClaudeEntry { credentials, config });
    }

    let mut codex = BTreeMap::new();
    for name in store.list(Service::Codex)? {
        let auth = stored_value(store, Service::Codex, &name, ProfileKind::Auth)?;
        codex.insert(name, CodexEntry { auth });
    }

    info!(
        claude = claude.len(),
        codex = codex.len(),
        "exported accounts"
    );
    Ok(ExportBundle {
        version: BUNDLE_VERSION.to_string(),
        export_date: Some(Utc::now()),
        is_encrypted: session.is_unlocked(),
        claude,
        codex,
    })
}

/// A stored file as a JSON value, without decrypting it.
fn stored_value(store: &VaultStore, service: Service, name: &str, kind: ProfileKind) -> Result<Value> {
    let path = store.resolve_path(service, name, kind)?;
    match store.read_blob(&path)? {
        StoredBlob::Sealed(envelope) => envelope.to_value(),
        StoredBlob::Plaintext(text) => serde_json::from_str(&text)
            .map_err(|e| CredSwapError::SerializationError(format!("{}: {e}", path.display()))),
    }
}

struct StagedBlob {
    service: Service,
    name: String,
    kind: ProfileKind,
    blob: StoredBlob,
}

/// Write every profile of `bundle` into the store.
///
/// All entries are checked before anything is written: names must be
/// valid, and with an unlocked session every envelope must open under the
/// session password or the import fails with `ImportPasswordMismatch`.
/// Envelopes are stored as-is; plaintext entries are sealed when the
/// session is unlocked. Existing profiles of the same name are replaced.
pub fn import_bundle(
    store: &VaultStore,
    session: &Session,
    bundle: ExportBundle,
) -> Result<ImportCounts> {
    session.ensure_access()?;

    let mut staged = Vec::new();
    for (name, entry) in bundle.claude {
        staged.push((Service::Claude, name.clone(), ProfileKind::Credentials, entry.credentials));
        staged.push((Service::Claude, name, ProfileKind::Config, entry.config));
    }
    for (name, entry) in bundle.codex {
        staged.push((Service::Codex, name, ProfileKind::Auth, entry.auth));
    }

    // Validate everything first.
    let mut blobs = Vec::with_capacity(staged.len());
    for (service, name, kind, value) in staged {
        store.resolve_path(service, &name, kind)?;

        let blob = StoredBlob::from_value(value).map_err(|e| match e {
            CredSwapError::DecryptionFailed => CredSwapError::ImportPasswordMismatch(name.clone()),
            other => other,
        })?;
        if let (StoredBlob::Sealed(sealed), Some(password)) = (&blob, session.password()) {
            envelope::decrypt(sealed, password)
                .map_err(|_| CredSwapError::ImportPasswordMismatch(name.clone()))?;
        }
        blobs.push(StagedBlob {
            service,
            name,
            kind,
            blob,
        });
    }

    let mut counts = ImportCounts::default();
    for staged in blobs {
        match staged.blob {
            StoredBlob::Sealed(sealed) => {
                let path = store.resolve_path(staged.service, &staged.name, staged.kind)?;
                store.write_raw(&path, &sealed.to_json()?)?;
            }
            StoredBlob::Plaintext(text) => {
                store.write_profile(session, staged.service, &staged.name, staged.kind, &text)?;
            }
        }

        match staged.kind {
            ProfileKind::Config => counts.claude += 1,
            ProfileKind::Auth => counts.codex += 1,
            ProfileKind::Credentials => {}
        }
    }

    info!(
        claude = counts.claude,
        codex = counts.codex,
        "imported accounts"
    );
    Ok(counts)
}
