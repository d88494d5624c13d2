//! Services and the blobs that make up a saved profile.

use std::fmt;
use std::str::FromStr;

use crate::errors::{CredSwapError, Result};

/// One of the two external CLI tools whose credentials are managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    /// Two live files: OAuth credentials plus the account config.
    Claude,
    /// One live file: `auth.json`.
    Codex,
}

impl Service {
    /// Every supported service, in display order.
    pub const ALL: [Service; 2] = [Service::Claude, Service::Codex];

    /// Directory / bundle key name.
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Claude => "claude",
            Service::Codex => "codex",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Service::Claude => "Claude",
            Service::Codex => "Codex",
        }
    }

    /// Parse a service name. Only the exact lowercase names are accepted.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "claude" => Ok(Service::Claude),
            "codex" => Ok(Service::Codex),
            other => Err(CredSwapError::InvalidService(other.to_string())),
        }
    }

    /// The blobs a profile of this service consists of.
    pub fn kinds(self) -> &'static [ProfileKind] {
        match self {
            Service::Claude => &[ProfileKind::Credentials, ProfileKind::Config],
            Service::Codex => &[ProfileKind::Auth],
        }
    }

    /// The blob whose file suffix identifies a saved profile when listing.
    pub fn listing_kind(self) -> ProfileKind {
        match self {
            Service::Claude => ProfileKind::Config,
            Service::Codex => ProfileKind::Auth,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = CredSwapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One stored blob of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Claude OAuth credentials (`.credentials.json`).
    Credentials,
    /// Claude account config (`.claude.json`).
    Config,
    /// Codex `auth.json`.
    Auth,
}

impl ProfileKind {
    /// File name suffix inside the service directory.
    pub fn suffix(self) -> &'static str {
        match self {
            ProfileKind::Credentials => "-credentials.json",
            ProfileKind::Config => "-config.json",
            ProfileKind::Auth => ".json",
        }
    }

    /// Stored file name for the account `name`.
    pub fn file_name(self, name: &str) -> String {
        format!("{name}{}", self.suffix())
    }

    /// Short label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            ProfileKind::Credentials => "credentials",
            ProfileKind::Config => "config",
            ProfileKind::Auth => "auth",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
