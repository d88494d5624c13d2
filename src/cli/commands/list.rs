//! `credswap list`: display saved accounts in a table.
//!
//! Only names are listed, so no password is needed.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::vault::Service;

/// Execute the `list` command.
pub fn execute(cli: &Cli, service: Option<&str>) -> Result<()> {
    let ctx = Context::load(cli)?;

    let services = match service {
        Some(name) => vec![Service::parse(name)?],
        None => Service::ALL.to_vec(),
    };

    let mut accounts = Vec::with_capacity(services.len());
    for service in services {
        accounts.push((service, ctx.store.list(service)?));
    }

    output::print_accounts_table(&accounts);
    Ok(())
}
