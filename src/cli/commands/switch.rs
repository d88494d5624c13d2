//! `credswap switch`: make a saved account the live login.

use crate::audit::Operation;
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::switcher::AccountSwitcher;
use crate::vault::{sanitize_name, Service};

/// Execute the `switch` command.
pub fn execute(cli: &Cli, service: &str, name: &str) -> Result<()> {
    let service = Service::parse(service)?;
    let name = sanitize_name(name)?;

    let mut ctx = Context::load(cli)?;
    ctx.unlock()?;

    let switcher = AccountSwitcher::new(&ctx.store, &ctx.live);
    let backups = switcher.switch(&ctx.session, service, &name)?;

    ctx.audit(
        Operation::Switch,
        Some(service),
        Some(&name),
        Some(&format!("{} backup(s)", backups.len())),
    );

    output::success(&format!(
        "Switched {} to '{name}'",
        service.display_name()
    ));
    for backup in &backups {
        output::tip(&format!("Previous login backed up to {}", backup.display()));
    }
    output::tip(&format!(
        "Restart the {} CLI to pick up the new login.",
        service.display_name()
    ));
    Ok(())
}
