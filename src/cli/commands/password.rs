//! `credswap password`: protect the vault or change its password.
//!
//! `setup` writes the password config and encrypts every saved account.
//! `change` decrypts every saved account with the current password, and
//! only if all of them decrypt, re-encrypts them under the new one.

use crate::audit::Operation;
use crate::cli::output;
use crate::cli::{prompt_new_password, prompt_password, Cli, Context, PasswordAction};
use crate::cli::{NEW_PASSWORD_ENV, PASSWORD_ENV};
use crate::errors::{CredSwapError, Result};

/// Execute a `password` subcommand.
pub fn execute(cli: &Cli, action: &PasswordAction) -> Result<()> {
    match action {
        PasswordAction::Setup => setup(cli),
        PasswordAction::Change => change(cli),
    }
}

fn setup(cli: &Cli) -> Result<()> {
    let mut ctx = Context::load(cli)?;
    if ctx.passwords.is_configured() {
        return Err(CredSwapError::PasswordAlreadyConfigured);
    }

    output::info("Choose a password to protect saved accounts.");
    let password = prompt_new_password(PASSWORD_ENV)?;

    let report = ctx
        .passwords
        .setup(&ctx.store, &mut ctx.session, &password)?;

    for (path, reason) in &report.failed {
        output::warning(&format!(
            "Could not encrypt {}: {reason}",
            path.display()
        ));
    }

    ctx.audit(
        Operation::PasswordSetup,
        None,
        None,
        Some(&format!(
            "{} encrypted, {} failed",
            report.encrypted.len(),
            report.failed.len()
        )),
    );

    output::success(&format!(
        "Vault password set ({} file(s) encrypted)",
        report.encrypted.len()
    ));
    Ok(())
}

fn change(cli: &Cli) -> Result<()> {
    let mut ctx = Context::load(cli)?;
    if !ctx.passwords.is_configured() {
        return Err(CredSwapError::PasswordNotConfigured);
    }

    output::info("Enter your current vault password.");
    let old_password = prompt_password("Current vault password")?;

    output::info("Choose your new vault password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    let count = ctx
        .passwords
        .change(&ctx.store, &mut ctx.session, &old_password, &new_password)?;

    ctx.audit(
        Operation::PasswordChange,
        None,
        None,
        Some(&format!("{count} file(s) re-encrypted")),
    );

    output::success(&format!(
        "Vault password changed ({count} file(s) re-encrypted)"
    ));
    Ok(())
}
