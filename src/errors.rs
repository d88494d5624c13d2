use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in credswap.
#[derive(Debug, Error)]
pub enum CredSwapError {
    // --- Validation errors ---
    #[error("Invalid service '{0}' — expected 'claude' or 'codex'")]
    InvalidService(String),

    #[error("Invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Password already configured")]
    PasswordAlreadyConfigured,

    #[error("Invalid backup file format: {0}")]
    InvalidBundle(String),

    // --- Authentication errors ---
    #[error("Password authentication required — the vault is locked")]
    AuthenticationRequired,

    #[error("Incorrect password")]
    AuthenticationFailed,

    #[error("Cannot decrypt imported account '{0}' — was it exported with a different password?")]
    ImportPasswordMismatch(String),

    // --- Not found ---
    #[error("No active {0} found")]
    LiveCredentialNotFound(String),

    #[error("Saved {service} account '{name}' not found")]
    AccountNotFound { service: String, name: String },

    #[error("No password configured")]
    PasswordNotConfigured,

    // --- Sandbox ---
    #[error("Path traversal detected: {0}")]
    PathTraversal(PathBuf),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Unsupported envelope version {0}")]
    UnsupportedEnvelope(u64),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Failed to decrypt {path}: {reason} — no files were changed")]
    MigrationAborted { path: PathBuf, reason: String },

    // --- Remote telemetry ---
    #[error("Usage data unavailable: {0}")]
    RemoteUnavailable(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization / config errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid password config: {0}")]
    InvalidPasswordConfig(String),

    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("Audit error: {0}")]
    AuditError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Coarse classification of a [`CredSwapError`].
///
/// Callers that only need to decide *how* to react (prompt for a password,
/// show "not found", give up on usage data) match on this instead of on
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    AuthenticationRequired,
    AuthenticationFailed,
    NotFound,
    PathTraversal,
    Io,
    DecryptFailure,
    RemoteUnavailable,
    Internal,
}

impl CredSwapError {
    /// Classify this error into the vault's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidService(_)
            | Self::InvalidAccountName(_)
            | Self::PasswordTooShort(_)
            | Self::PasswordAlreadyConfigured
            | Self::InvalidBundle(_) => ErrorKind::Validation,

            Self::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            Self::AuthenticationFailed | Self::ImportPasswordMismatch(_) => {
                ErrorKind::AuthenticationFailed
            }

            Self::LiveCredentialNotFound(_)
            | Self::AccountNotFound { .. }
            | Self::PasswordNotConfigured => ErrorKind::NotFound,

            Self::PathTraversal(_) => ErrorKind::PathTraversal,
            Self::Io(_) => ErrorKind::Io,

            Self::DecryptionFailed
            | Self::UnsupportedEnvelope(_)
            | Self::MigrationAborted { .. } => ErrorKind::DecryptFailure,

            Self::RemoteUnavailable(_) => ErrorKind::RemoteUnavailable,

            Self::EncryptionFailed(_)
            | Self::KeyDerivationFailed(_)
            | Self::SerializationError(_)
            | Self::InvalidPasswordConfig(_)
            | Self::ConfigError(_)
            | Self::AuditError(_)
            | Self::CommandFailed(_)
            | Self::UserCancelled => ErrorKind::Internal,
        }
    }
}

/// Convenience type alias for credswap results.
pub type Result<T> = std::result::Result<T, CredSwapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            CredSwapError::InvalidAccountName("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CredSwapError::ImportPasswordMismatch("work".into()).kind(),
            ErrorKind::AuthenticationFailed
        );
        assert_eq!(
            CredSwapError::AccountNotFound {
                service: "codex".into(),
                name: "work".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CredSwapError::MigrationAborted {
                path: PathBuf::from("a.json"),
                reason: "bad".into()
            }
            .kind(),
            ErrorKind::DecryptFailure
        );
    }

    #[test]
    fn decryption_failure_message_does_not_leak_cause() {
        let msg = CredSwapError::DecryptionFailed.to_string();
        assert!(msg.contains("wrong password or corrupted data"));
    }
}
