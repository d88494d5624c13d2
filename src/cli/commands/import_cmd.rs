//! `credswap import`: load accounts from an export file.

use std::fs;

use crate::audit::Operation;
use crate::bundle::{import_bundle, ExportBundle};
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{CredSwapError, Result};

/// Execute the `import` command.
pub fn execute(cli: &Cli, file: &str) -> Result<()> {
    let content = fs::read_to_string(file)
        .map_err(|e| CredSwapError::CommandFailed(format!("cannot read {file}: {e}")))?;
    let bundle = ExportBundle::parse(&content)?;

    let mut ctx = Context::load(cli)?;
    ctx.unlock()?;

    let counts = import_bundle(&ctx.store, &ctx.session, bundle)?;

    ctx.audit(
        Operation::Import,
        None,
        None,
        Some(&format!("{} claude, {} codex", counts.claude, counts.codex)),
    );

    output::success(&format!(
        "Imported {} Claude and {} Codex account(s)",
        counts.claude, counts.codex
    ));
    Ok(())
}
