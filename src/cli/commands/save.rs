//! `credswap save`: store the live login under a name.

use crate::audit::Operation;
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::switcher::AccountSwitcher;
use crate::vault::{sanitize_name, Service};

/// Execute the `save` command.
pub fn execute(cli: &Cli, service: &str, name: &str) -> Result<()> {
    let service = Service::parse(service)?;
    let name = sanitize_name(name)?;

    let mut ctx = Context::load(cli)?;
    ctx.unlock()?;

    let replacing = ctx.store.exists(service, &name)?;
    let switcher = AccountSwitcher::new(&ctx.store, &ctx.live);
    switcher.save(&ctx.session, service, &name)?;

    ctx.audit(
        Operation::Save,
        Some(service),
        Some(&name),
        replacing.then_some("replaced existing"),
    );

    output::success(&format!(
        "Saved {} account '{name}'{}",
        service.display_name(),
        if ctx.session.is_unlocked() { " (encrypted)" } else { "" }
    ));
    if !ctx.session.is_protected() {
        output::tip("Run `credswap password setup` to encrypt saved accounts.");
    }
    Ok(())
}
