//! `credswap current`: who each tool is logged in as.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::live::current_accounts;

/// Execute the `current` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    output::print_current(&current_accounts(&ctx.live));
    Ok(())
}
