//! Vault password lifecycle: setup, verify, change.
//!
//! The password itself is never stored.  `password.json` holds a PBKDF2
//! hash of it with its own salt:
//!
//! ```json
//! { "salt": "<hex>", "hash": "<hex>", "iterations": 100000, "algorithm": "pbkdf2-sha512" }
//! ```
//!
//! The file's existence is what marks the vault as protected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::crypto::kdf::{self, ALGORITHM, PBKDF2_ITERATIONS};
use crate::errors::{CredSwapError, Result};
use crate::session::Session;
use crate::vault::migration::{self, MigrationReport};
use crate::vault::store::write_atomic;
use crate::vault::VaultStore;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Stored password verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Salt for the verifier hash (hex in JSON).
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,

    /// PBKDF2 output for the password (hex in JSON).
    #[serde(with = "hex::serde")]
    pub hash: Vec<u8>,

    /// Iteration count the hash was computed with.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Derivation algorithm name.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

fn default_iterations() -> u32 {
    PBKDF2_ITERATIONS
}

fn default_algorithm() -> String {
    ALGORITHM.to_string()
}

impl PasswordConfig {
    /// Build a fresh verifier for `password` with a new random salt.
    pub fn create(password: &str) -> Result<Self> {
        let salt = kdf::generate_salt();
        let hash = kdf::derive_key(password.as_bytes(), &salt)?;
        Ok(Self {
            salt: salt.to_vec(),
            hash: hash.to_vec(),
            iterations: PBKDF2_ITERATIONS,
            algorithm: ALGORITHM.to_string(),
        })
    }

    /// Check `password` against the stored hash in constant time.
    pub fn matches(&self, password: &str) -> Result<bool> {
        if self.algorithm != ALGORITHM {
            return Err(CredSwapError::InvalidPasswordConfig(format!(
                "unsupported algorithm '{}'",
                self.algorithm
            )));
        }

        let computed =
            kdf::derive_key_with_iterations(password.as_bytes(), &self.salt, self.iterations)?;

        // Use constant-time comparison to avoid timing side channels.
        Ok(computed.as_slice().ct_eq(&self.hash).into())
    }
}

/// Manages the vault's single password config.
#[derive(Debug, Clone)]
pub struct PasswordManager {
    config_path: PathBuf,
}

impl PasswordManager {
    /// Manage the password config stored at `config_path`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Path to `password.json`.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns `true` if a password has been configured.
    pub fn is_configured(&self) -> bool {
        self.config_path.is_file()
    }

    /// A locked session for this vault.
    pub fn session(&self) -> Session {
        Session::for_vault(self.is_configured())
    }

    /// Load the stored password config.
    pub fn load(&self) -> Result<PasswordConfig> {
        if !self.is_configured() {
            return Err(CredSwapError::PasswordNotConfigured);
        }
        let contents = fs::read_to_string(&self.config_path)?;
        serde_json::from_str(&contents)
            .map_err(|e| CredSwapError::InvalidPasswordConfig(e.to_string()))
    }

    /// Returns `true` if `password` matches. An unconfigured vault matches
    /// nothing.
    pub fn check(&self, password: &str) -> Result<bool> {
        if !self.is_configured() {
            return Ok(false);
        }
        self.load()?.matches(password)
    }

    /// Protect the vault with a password for the first time.
    ///
    /// Writes the password config, unlocks `session`, then seals every
    /// plaintext profile already in `store`.
    pub fn setup(
        &self,
        store: &VaultStore,
        session: &mut Session,
        password: &str,
    ) -> Result<MigrationReport> {
        if self.is_configured() {
            return Err(CredSwapError::PasswordAlreadyConfigured);
        }
        validate_new_password(password)?;

        self.write_config(password)?;
        session.unlock(password);
        info!("vault password configured");

        let report = migration::encrypt_all(store, password)?;
        if !report.is_clean() {
            warn!(
                failed = report.failed.len(),
                "some stored files were left unencrypted"
            );
        }
        Ok(report)
    }

    /// Unlock `session` with `password`.
    pub fn verify(&self, session: &mut Session, password: &str) -> Result<()> {
        if !self.is_configured() {
            return Err(CredSwapError::PasswordNotConfigured);
        }
        if !self.check(password)? {
            warn!("password verification failed");
            return Err(CredSwapError::AuthenticationFailed);
        }
        session.unlock(password);
        Ok(())
    }

    /// Change the vault password.
    ///
    /// Re-encrypts every stored file from `old` to `new` (all-or-nothing
    /// with respect to wrong passwords), then replaces the password config
    /// and moves `session` to the new password. Returns the number of
    /// files re-encrypted.
    pub fn change(
        &self,
        store: &VaultStore,
        session: &mut Session,
        old: &str,
        new: &str,
    ) -> Result<usize> {
        validate_new_password(new)?;
        if !self.check(old)? {
            return Err(CredSwapError::AuthenticationFailed);
        }

        let count = migration::change_password(store, old, new)?;
        self.write_config(new)?;
        session.unlock(new);
        info!(files = count, "vault password changed");
        Ok(count)
    }

    fn write_config(&self, password: &str) -> Result<()> {
        let config = PasswordConfig::create(password)?;
        let json = serde_json::to_string_pretty(&config)
            .map_err(|e| CredSwapError::SerializationError(format!("password config: {e}")))?;
        write_atomic(&self.config_path, json.as_bytes())
    }
}

fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredSwapError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}
