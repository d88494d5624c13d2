//! `credswap status`: vault protection state and saved account counts.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::vault::migration::find_sealed_files;
use crate::vault::Service;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;

    output::info(&format!("Data directory: {}", ctx.data_dir.display()));

    for service in Service::ALL {
        let count = ctx.store.list(service)?.len();
        output::info(&format!(
            "{}: {count} saved account(s)",
            service.display_name()
        ));
    }

    if ctx.passwords.is_configured() {
        output::success("Vault is password protected");
        return Ok(());
    }

    output::warning("Vault is not password protected; saved accounts are stored as plain JSON");

    // Envelopes without a password config can never be opened again.
    let orphaned = find_sealed_files(&ctx.store)?;
    if !orphaned.is_empty() {
        output::warning(&format!(
            "{} encrypted file(s) found but no password is configured (password.json missing):",
            orphaned.len()
        ));
        for path in &orphaned {
            eprintln!("    {}", path.display());
        }
    }

    output::tip("Run `credswap password setup` to encrypt saved accounts.");
    Ok(())
}
