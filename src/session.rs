//! The in-memory session: the vault password for this process, if any.
//!
//! The password is held in a `Zeroizing` buffer and never serialized,
//! logged or written anywhere.  Only [`crate::password::PasswordManager`]
//! can set it; everything else gets read access through `&Session`.

use std::fmt;

use zeroize::Zeroizing;

use crate::errors::{CredSwapError, Result};

/// Process-lifetime vault session.
#[derive(Default)]
pub struct Session {
    /// Whether a password config exists for the vault this session serves.
    protected: bool,

    /// The unlocked vault password.
    password: Option<Zeroizing<String>>,
}

impl Session {
    /// A session for an unprotected vault (no password config).
    pub fn new() -> Self {
        Self::default()
    }

    /// A locked session for a vault that may be protected.
    pub fn for_vault(protected: bool) -> Self {
        Self {
            protected,
            password: None,
        }
    }

    /// The session password, if the vault has been unlocked.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|pw| pw.as_str())
    }

    /// Returns `true` once a password has been set for this session.
    pub fn is_unlocked(&self) -> bool {
        self.password.is_some()
    }

    /// Returns `true` if the vault has a password config.
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Fail with `AuthenticationRequired` when the vault is protected but
    /// this session has not been unlocked.
    pub fn ensure_access(&self) -> Result<()> {
        if self.protected && !self.is_unlocked() {
            return Err(CredSwapError::AuthenticationRequired);
        }
        Ok(())
    }

    /// Forget the password.
    pub fn lock(&mut self) {
        self.password = None;
    }

    pub(crate) fn unlock(&mut self, password: &str) {
        self.protected = true;
        self.password = Some(Zeroizing::new(password.to_string()));
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("protected", &self.protected)
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}
