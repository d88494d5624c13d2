//! `credswap delete`: remove a saved account.

use dialoguer::Confirm;

use crate::audit::Operation;
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{CredSwapError, Result};
use crate::switcher::AccountSwitcher;
use crate::vault::{sanitize_name, Service};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, service: &str, name: &str, force: bool) -> Result<()> {
    let service = Service::parse(service)?;
    let name = sanitize_name(name)?;
    let ctx = Context::load(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete saved {} account '{name}'?",
                service.display_name()
            ))
            .default(false)
            .interact()
            .map_err(|e| CredSwapError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    AccountSwitcher::new(&ctx.store, &ctx.live).delete(service, &name)?;

    ctx.audit(Operation::Delete, Some(service), Some(&name), None);
    output::success(&format!(
        "Deleted {} account '{name}'",
        service.display_name()
    ));
    Ok(())
}
