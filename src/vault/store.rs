//! On-disk profile storage.
//!
//! `VaultStore` owns the accounts directory:
//!
//! ```text
//! <root>/claude/<name>-credentials.json
//! <root>/claude/<name>-config.json
//! <root>/codex/<name>.json
//! ```
//!
//! Reads decrypt envelopes transparently and writes encrypt whenever the
//! session holds a password.  Every path derived from an account name is
//! sanitized and then containment-checked against the service directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use super::names::{ensure_within, sanitize_name};
use super::profile::{ProfileKind, Service};
use crate::crypto::envelope::{self, StoredBlob};
use crate::errors::{CredSwapError, Result};
use crate::session::Session;

/// Handle on the accounts directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    /// Create a store rooted at `root`. Nothing is created on disk until
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path to the accounts directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the profiles of one service.
    pub fn service_dir(&self, service: Service) -> PathBuf {
        self.root.join(service.as_str())
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    /// Build the on-disk path of one profile blob.
    ///
    /// The name is sanitized first; the resulting path is then verified
    /// to lie strictly inside the service directory.
    pub fn resolve_path(&self, service: Service, name: &str, kind: ProfileKind) -> Result<PathBuf> {
        if !service.kinds().contains(&kind) {
            return Err(CredSwapError::InvalidService(format!(
                "{service} profiles have no {kind} file"
            )));
        }

        let name = sanitize_name(name)?;
        let service_dir = self.service_dir(service);
        let candidate = service_dir.join(kind.file_name(&name));
        ensure_within(&candidate, &service_dir)
    }

    /// Paths of every blob of a profile, in `Service::kinds` order.
    pub fn profile_paths(&self, service: Service, name: &str) -> Result<Vec<(ProfileKind, PathBuf)>> {
        service
            .kinds()
            .iter()
            .map(|&kind| Ok((kind, self.resolve_path(service, name, kind)?)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Profile operations
    // ------------------------------------------------------------------

    /// List saved profile names for a service, sorted.
    ///
    /// A missing service directory is an empty list.
    pub fn list(&self, service: Service) -> Result<Vec<String>> {
        let dir = self.service_dir(service);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let suffix = service.listing_kind().suffix();
        let mut names = Vec::new();

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(name) = file_name.strip_suffix(suffix) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Returns `true` if every blob of the profile exists.
    pub fn exists(&self, service: Service, name: &str) -> Result<bool> {
        Ok(self
            .profile_paths(service, name)?
            .iter()
            .all(|(_, path)| path.is_file()))
    }

    /// Read one profile blob as plaintext JSON text.
    ///
    /// Envelopes are decrypted with the session password; reading one
    /// from a locked session fails with `AuthenticationRequired`.
    pub fn read_profile(
        &self,
        session: &Session,
        service: Service,
        name: &str,
        kind: ProfileKind,
    ) -> Result<Zeroizing<String>> {
        let path = self.resolve_path(service, name, kind)?;
        if !path.is_file() {
            return Err(CredSwapError::AccountNotFound {
                service: service.to_string(),
                name: name.to_string(),
            });
        }

        self.read_blob(&path)?.open(session.password())
    }

    /// Write one profile blob.
    ///
    /// With a session password the text is sealed in an envelope;
    /// otherwise it is stored verbatim. Returns the path written.
    pub fn write_profile(
        &self,
        session: &Session,
        service: Service,
        name: &str,
        kind: ProfileKind,
        json: &str,
    ) -> Result<PathBuf> {
        let path = self.resolve_path(service, name, kind)?;

        match session.password() {
            Some(password) => {
                let sealed = envelope::encrypt(json, password)?;
                write_atomic(&path, sealed.to_json()?.as_bytes())?;
            }
            None => write_atomic(&path, json.as_bytes())?,
        }

        debug!(
            service = %service,
            kind = %kind,
            encrypted = session.is_unlocked(),
            "wrote profile blob"
        );
        Ok(path)
    }

    /// Remove every existing blob of a profile. Returns how many files
    /// were removed.
    pub fn remove_profile(&self, service: Service, name: &str) -> Result<usize> {
        let mut removed = 0;
        for (_, path) in self.profile_paths(service, name)? {
            if path.is_file() {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Raw file access (migration, bundles)
    // ------------------------------------------------------------------

    /// Every stored `.json` file across all services, sorted.
    pub fn stored_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for service in Service::ALL {
            let dir = self.service_dir(service);
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let path = entry.path();
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(true, |n| n.starts_with('.'));
                if !hidden && path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Read and classify a stored file.
    pub fn read_blob(&self, path: &Path) -> Result<StoredBlob> {
        let path = ensure_within(path, &self.root)?;
        let text = fs::read_to_string(&path)?;
        StoredBlob::parse(text)
    }

    /// Overwrite a stored file with `contents`.
    pub fn write_raw(&self, path: &Path, contents: &str) -> Result<()> {
        let path = ensure_within(path, &self.root)?;
        write_atomic(&path, contents.as_bytes())
    }
}

/// Write a file **atomically** with owner-only permissions.
///
/// Writes to a temp file in the same directory, then renames it over the
/// target, so readers never observe a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}
