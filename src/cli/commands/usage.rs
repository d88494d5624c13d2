//! `credswap usage`: quota estimates for the live logins.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::usage::{usage_report, UsageClient};

/// Execute the `usage` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let client = UsageClient::new(
        ctx.settings.usage_endpoint.clone(),
        ctx.settings.usage_timeout(),
    );

    output::print_usage(&usage_report(&ctx.live, &client));
    Ok(())
}
