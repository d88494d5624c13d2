//! CLI module: Clap argument parser, shared context, output helpers, and
//! command implementations.

pub mod commands;
pub mod output;

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use zeroize::Zeroizing;

use crate::audit::Operation;
use crate::config::Settings;
use crate::errors::{CredSwapError, Result};
use crate::live::LiveLocations;
use crate::password::{PasswordManager, MIN_PASSWORD_LEN};
use crate::session::Session;
use crate::vault::{Service, VaultStore};

/// Environment variable holding the vault password for scripted use.
pub const PASSWORD_ENV: &str = "CREDSWAP_PASSWORD";

/// Environment variable holding the new password for `password change`.
pub const NEW_PASSWORD_ENV: &str = "CREDSWAP_NEW_PASSWORD";

/// credswap: keep several Claude and Codex logins and swap between them.
#[derive(Parser)]
#[command(
    name = "credswap",
    about = "Encrypted multi-profile credential switcher for the Claude and Codex CLIs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: platform data dir + /credswap)
    #[arg(long, env = "CREDSWAP_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Home directory holding the live credential files (default: $HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show vault protection state
    Status,

    /// Show the accounts each tool is logged in with
    Current,

    /// List saved accounts
    List {
        /// Only this service (claude or codex)
        service: Option<String>,
    },

    /// Save the live login as a named account
    Save {
        /// claude or codex
        service: String,
        /// Account name
        name: String,
    },

    /// Make a saved account the live login (the current one is backed up)
    Switch {
        /// claude or codex
        service: String,
        /// Account name
        name: String,
    },

    /// Delete a saved account
    Delete {
        /// claude or codex
        service: String,
        /// Account name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Manage the vault password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },

    /// Export all saved accounts to one JSON file
    Export {
        /// Output file (`-` for stdout; default: accounts-backup-<date>.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import accounts from an export file
    Import {
        /// Path to the export file
        file: String,
    },

    /// Show quota usage of the live logins
    Usage,

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
        /// Only entries for this service (claude or codex)
        #[arg(long)]
        service: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Password subcommands.
#[derive(clap::Subcommand)]
pub enum PasswordAction {
    /// Protect the vault with a password (encrypts saved accounts)
    Setup,

    /// Change the vault password (re-encrypts saved accounts)
    Change,
}

// ---------------------------------------------------------------------------
// Shared context
// ---------------------------------------------------------------------------

/// Everything a command needs: resolved paths, settings, the vault and a
/// (locked) session.
pub struct Context {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub store: VaultStore,
    pub live: LiveLocations,
    pub passwords: PasswordManager,
    pub session: Session,
}

impl Context {
    /// Resolve directories and load settings. Creates the data directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let data_dir = resolve_data_dir(cli)?;
        fs::create_dir_all(&data_dir)?;

        let settings = Settings::load(&data_dir)?;

        let live = match cli.home.as_ref().or(settings.home_dir.as_ref()) {
            Some(home) => LiveLocations::new(home),
            None => LiveLocations::from_env()?,
        };

        let store = VaultStore::new(settings.accounts_path(&data_dir));
        let passwords = PasswordManager::new(data_dir.join("password.json"));
        let session = passwords.session();

        debug!(
            data_dir = %data_dir.display(),
            home = %live.home().display(),
            protected = session.is_protected(),
            "context loaded"
        );

        Ok(Self {
            data_dir,
            settings,
            store,
            live,
            passwords,
            session,
        })
    }

    /// Unlock the session if the vault is protected.
    pub fn unlock(&mut self) -> Result<()> {
        if !self.session.is_protected() || self.session.is_unlocked() {
            return Ok(());
        }
        let password = prompt_password("Enter vault password")?;
        self.passwords.verify(&mut self.session, &password)
    }

    /// Record an operation in the audit log, if enabled.
    pub fn audit(
        &self,
        operation: Operation,
        service: Option<Service>,
        account: Option<&str>,
        details: Option<&str>,
    ) {
        #[cfg(feature = "audit-log")]
        if self.settings.audit_log {
            if let Some(audit) = crate::audit::AuditLog::open(&self.data_dir) {
                audit.record(operation, service, account, details);
            }
        }

        #[cfg(not(feature = "audit-log"))]
        let _ = (operation, service, account, details);
    }
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|dir| dir.join("credswap"))
        .ok_or_else(|| CredSwapError::ConfigError("cannot determine data directory".into()))
}

// ---------------------------------------------------------------------------
// Password prompts
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `CREDSWAP_PASSWORD` env var
/// 2. Interactive prompt
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| CredSwapError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` is checked first for scripted use. Interactive input shorter
/// than the minimum length is asked for again.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(env_var) {
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| CredSwapError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

fn password_from_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}
