//! Bulk re-encryption of every stored profile file.
//!
//! Two passes are driven by password lifecycle events:
//!
//! - [`encrypt_all`] runs when a password is first configured and seals
//!   every plaintext file.  Per-file failures are reported, not fatal.
//! - [`change_password`] runs on password change.  It decrypts every file
//!   into memory first and only starts writing once all of them decrypted,
//!   so a wrong old password never leaves a half-migrated vault.

use std::path::PathBuf;

use tracing::{info, warn};
use zeroize::Zeroizing;

use super::store::VaultStore;
use crate::crypto::envelope::{self, StoredBlob};
use crate::errors::{CredSwapError, Result};

/// Report of what [`encrypt_all`] did.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Files that were plaintext and are now sealed.
    pub encrypted: Vec<PathBuf>,
    /// Files that were already envelopes.
    pub skipped: Vec<PathBuf>,
    /// Files that could not be migrated, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl MigrationReport {
    /// Returns `true` when no file failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Seal every plaintext file in the store under `password`.
///
/// Files already holding an envelope are skipped.  A file that cannot be
/// read, parsed or written is recorded in the report and the pass moves
/// on to the next one.
pub fn encrypt_all(store: &VaultStore, password: &str) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    for path in store.stored_files()? {
        match encrypt_file(store, &path, password) {
            Ok(true) => report.encrypted.push(path),
            Ok(false) => report.skipped.push(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to encrypt stored file");
                report.failed.push((path, e.to_string()));
            }
        }
    }

    info!(
        encrypted = report.encrypted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "encrypted existing vault files"
    );
    Ok(report)
}

/// Returns `Ok(true)` if the file was encrypted, `Ok(false)` if skipped.
fn encrypt_file(store: &VaultStore, path: &std::path::Path, password: &str) -> Result<bool> {
    match store.read_blob(path)? {
        StoredBlob::Sealed(_) => Ok(false),
        StoredBlob::Plaintext(text) => {
            let text = Zeroizing::new(text);
            let sealed = envelope::encrypt(&text, password)?;
            store.write_raw(path, &sealed.to_json()?)?;
            Ok(true)
        }
    }
}

/// Re-encrypt every stored file from `old` to `new`.
///
/// Phase 1 reads every file into memory, decrypting envelopes with `old`
/// and taking plaintext files as they are.  If any file fails, the whole
/// operation aborts with `MigrationAborted` and nothing has been written.
/// Phase 2 seals each plaintext under `new` and overwrites the file.
///
/// Returns the number of files re-encrypted.
pub fn change_password(store: &VaultStore, old: &str, new: &str) -> Result<usize> {
    // Phase 1: decrypt everything.
    let mut staged: Vec<(PathBuf, Zeroizing<String>)> = Vec::new();
    for path in store.stored_files()? {
        let plaintext = store
            .read_blob(&path)
            .and_then(|blob| blob.open(Some(old)))
            .map_err(|e| CredSwapError::MigrationAborted {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        staged.push((path, plaintext));
    }

    // Phase 2: re-encrypt under the new password.
    for (path, plaintext) in &staged {
        let sealed = envelope::encrypt(plaintext, new)?;
        store.write_raw(path, &sealed.to_json()?)?;
    }

    info!(files = staged.len(), "re-encrypted vault under new password");
    Ok(staged.len())
}

/// Sealed files present in the store.
///
/// Used to detect envelopes left behind when the password config was
/// removed: without it they can never be opened.  Unreadable files are
/// ignored.
pub fn find_sealed_files(store: &VaultStore) -> Result<Vec<PathBuf>> {
    Ok(store
        .stored_files()?
        .into_iter()
        .filter(|path| {
            store
                .read_blob(path)
                .map(|blob| blob.is_sealed())
                .unwrap_or(false)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::vault::profile::{ProfileKind, Service};
    use std::fs;
    use tempfile::TempDir;

    fn seeded_store() -> (TempDir, VaultStore) {
        let dir = TempDir::new().unwrap();
        let store = VaultStore::new(dir.path().join("accounts"));
        let session = Session::new();
        store
            .write_profile(&session, Service::Codex, "one", ProfileKind::Auth, "{\"n\":1}")
            .unwrap();
        store
            .write_profile(&session, Service::Codex, "two", ProfileKind::Auth, "{\"n\":2}")
            .unwrap();
        (dir, store)
    }

    #[test]
    fn encrypt_all_seals_plaintext_and_skips_envelopes() {
        let (_dir, store) = seeded_store();

        let first = encrypt_all(&store, "pw-1234").unwrap();
        assert_eq!(first.encrypted.len(), 2);
        assert!(first.skipped.is_empty());
        assert!(first.is_clean());

        let second = encrypt_all(&store, "pw-1234").unwrap();
        assert!(second.encrypted.is_empty());
        assert_eq!(second.skipped.len(), 2);
    }

    #[test]
    fn encrypt_all_continues_past_bad_files() {
        let (_dir, store) = seeded_store();
        let bad = store.service_dir(Service::Codex).join("broken.json");
        fs::write(&bad, "{not json").unwrap();

        let report = encrypt_all(&store, "pw-1234").unwrap();
        assert_eq!(report.encrypted.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad);
        assert_eq!(fs::read_to_string(&bad).unwrap(), "{not json");
    }

    #[test]
    fn find_sealed_files_reports_envelopes_only() {
        let (_dir, store) = seeded_store();
        assert!(find_sealed_files(&store).unwrap().is_empty());
        encrypt_all(&store, "pw-1234").unwrap();
        assert_eq!(find_sealed_files(&store).unwrap().len(), 2);
    }
}
