//! `credswap export`: write every saved account to one JSON file.
//!
//! Encrypted accounts stay encrypted in the export; import them into a
//! vault protected by the same password.

use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::audit::Operation;
use crate::bundle::{default_file_name, export_bundle};
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{CredSwapError, Result};
use crate::vault::store::write_atomic;

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&str>) -> Result<()> {
    let mut ctx = Context::load(cli)?;
    ctx.unlock()?;

    let bundle = export_bundle(&ctx.store, &ctx.session)?;
    let content = bundle.to_json()?;

    ctx.audit(
        Operation::Export,
        None,
        None,
        Some(&format!(
            "{} claude, {} codex, encrypted: {}",
            bundle.claude.len(),
            bundle.codex.len(),
            bundle.is_encrypted
        )),
    );

    let dest = match output_path {
        Some("-") => {
            // Raw output only, so it can be piped.
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{content}")?;
            return Ok(());
        }
        Some(dest) => dest.to_string(),
        None => default_file_name(Local::now().date_naive()),
    };

    write_atomic(Path::new(&dest), content.as_bytes()).map_err(|e| {
        CredSwapError::CommandFailed(format!("failed to write export file: {e}"))
    })?;

    output::success(&format!(
        "Exported {} account(s) to {dest}",
        bundle.len()
    ));
    if !bundle.is_encrypted && !bundle.is_empty() {
        output::warning("The export contains plaintext credentials; keep it safe.");
    }
    Ok(())
}
