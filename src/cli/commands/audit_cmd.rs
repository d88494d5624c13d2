//! `credswap audit`: display the audit log.
//!
//! Usage:
//!   credswap audit               # show last 50 entries
//!   credswap audit --last 20     # show last 20
//!   credswap audit --since 7d    # entries from last 7 days
//!   credswap audit --service codex

use chrono::{DateTime, Utc};

use crate::cli::Cli;
use crate::errors::{CredSwapError, Result};

/// Execute the `audit` command.
#[cfg(feature = "audit-log")]
pub fn execute(cli: &Cli, last: usize, since: Option<&str>, service: Option<&str>) -> Result<()> {
    use crate::audit::{AuditLog, AuditQuery};
    use crate::cli::{output, Context};
    use crate::vault::Service;

    let filter = AuditQuery {
        limit: last,
        since: since.map(parse_duration).transpose()?,
        service: service.map(Service::parse).transpose()?,
    };

    let ctx = Context::load(cli)?;
    let audit = AuditLog::open(&ctx.data_dir)
        .ok_or_else(|| CredSwapError::AuditError("failed to open audit database".into()))?;

    let entries = audit.query(filter)?;
    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

#[cfg(not(feature = "audit-log"))]
pub fn execute(_cli: &Cli, _last: usize, since: Option<&str>, service: Option<&str>) -> Result<()> {
    since.map(parse_duration).transpose()?;
    service.map(crate::vault::Service::parse).transpose()?;
    Err(CredSwapError::AuditError(
        "this build has no audit log (audit-log feature disabled)".into(),
    ))
}

/// Turn an age like `30m`, `24h`, `7d` or `2w` into the instant that long
/// before now.
fn parse_duration(input: &str) -> Result<DateTime<Utc>> {
    let age = input.trim();
    let invalid = |why: &str| {
        CredSwapError::CommandFailed(format!(
            "invalid --since '{age}': {why} (expected e.g. 30m, 24h, 7d, 2w)"
        ))
    };

    let unit_at = age
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| invalid("missing unit"))?;
    let (count, unit) = age.split_at(unit_at);
    let count: i64 = count.parse().map_err(|_| invalid("missing count"))?;

    let span = match unit {
        "m" => chrono::Duration::try_minutes(count),
        "h" => chrono::Duration::try_hours(count),
        "d" => chrono::Duration::try_days(count),
        "w" => chrono::Duration::try_weeks(count),
        _ => return Err(invalid("unknown unit")),
    }
    .ok_or_else(|| invalid("too large"))?;

    Utc::now()
        .checked_sub_signed(span)
        .ok_or_else(|| invalid("too large"))
}

/// Print audit entries in a formatted table.
#[cfg(feature = "audit-log")]
fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Service", "Account", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.service.clone().unwrap_or_else(|| "-".into()),
            entry.account.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
#[cfg(feature = "audit-log")]
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "save" => style(op).green().to_string(),
        "switch" => style(op).blue().to_string(),
        "delete" => style(op).red().to_string(),
        "password-setup" | "password-change" => style(op).yellow().to_string(),
        "export" | "import" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
