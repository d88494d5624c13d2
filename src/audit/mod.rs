//! Audit log: SQLite-based operation history.
//!
//! Records every vault operation (save, switch, delete, password change,
//! export, import) in `<data_dir>/audit.db`.  Only service and account
//! names are stored, never credential contents or passwords.
//!
//! If the database can't be opened or written to, operations continue
//! without logging.  Builds without the `audit-log` feature keep only
//! [`Operation`].

use std::fmt;

#[cfg(feature = "audit-log")]
mod log;

#[cfg(feature = "audit-log")]
pub use log::{AuditEntry, AuditLog, AuditQuery};

/// Operations worth recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Switch,
    Delete,
    PasswordSetup,
    PasswordChange,
    Export,
    Import,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Save => "save",
            Operation::Switch => "switch",
            Operation::Delete => "delete",
            Operation::PasswordSetup => "password-setup",
            Operation::PasswordChange => "password-change",
            Operation::Export => "export",
            Operation::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
