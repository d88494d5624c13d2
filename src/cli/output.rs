//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::live::{ActiveAccount, CurrentAccounts};
use crate::usage::{CodexUsage, UsageReport, WindowQuota};
use crate::vault::Service;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print saved accounts as a (Service, Account) table.
pub fn print_accounts_table(accounts: &[(Service, Vec<String>)]) {
    if accounts.iter().all(|(_, names)| names.is_empty()) {
        info("No saved accounts yet.");
        tip("Run `credswap save <claude|codex> <name>` to save the current login.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Service", "Account"]);

    for (service, names) in accounts {
        for name in names {
            table.add_row(vec![service.display_name().to_string(), name.clone()]);
        }
    }

    println!("{table}");
}

/// Print the live login of each tool.
pub fn print_current(current: &CurrentAccounts) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Service", "Email", "Plan"]);

    for (service, account) in [
        (Service::Claude, &current.claude),
        (Service::Codex, &current.codex),
    ] {
        let row = match account {
            Some(ActiveAccount { email, plan }) => {
                vec![service.display_name().to_string(), email.clone(), plan.clone()]
            }
            None => vec![
                service.display_name().to_string(),
                style("not logged in").dim().to_string(),
                String::new(),
            ],
        };
        table.add_row(row);
    }

    println!("{table}");
}

/// Print quota estimates for both tools.
pub fn print_usage(report: &UsageReport) {
    match &report.claude {
        Some(usage) => {
            println!(
                "{} ({})",
                style("Claude").bold(),
                usage.subscription_type
            );
            let mut table = quota_table(&["Window", "Used", "Limit", "Remaining", "%", "Resets"]);
            table.add_row(claude_row("5 hours", &usage.five_hour));
            table.add_row(claude_row("7 days", &usage.seven_day));
            println!("{table}");
        }
        None => warning("Claude usage unavailable"),
    }

    match &report.codex {
        Some(usage) => print_codex_usage(usage),
        None => warning("Codex usage unavailable (not logged in)"),
    }
}

fn print_codex_usage(usage: &CodexUsage) {
    println!("{} ({})", style("Codex").bold(), usage.plan_type);

    let Some(limits) = &usage.limits else {
        info("No recent Codex usage data found. Use the Codex CLI to generate some.");
        tip(&format!(
            "Check usage at {}",
            crate::usage::codex::DASHBOARD_URL
        ));
        return;
    };

    let mut table = quota_table(&["Window", "Used %", "Remaining %", "Minutes", "Resets"]);
    for (label, window) in [("Primary", &limits.primary), ("Secondary", &limits.secondary)] {
        table.add_row(vec![
            label.to_string(),
            format!("{:.1}", window.used_percent),
            format!("{:.1}", window.remaining_percent),
            window
                .window_minutes
                .map_or_else(|| "-".to_string(), |m| m.to_string()),
            window.resets_at.as_ref().map_or_else(|| "-".to_string(), format_time),
        ]);
    }
    println!("{table}");
}

fn quota_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn claude_row(label: &str, quota: &WindowQuota) -> Vec<String> {
    vec![
        label.to_string(),
        quota.used.to_string(),
        quota.limit.to_string(),
        quota.remaining.to_string(),
        format!("{:.1}", quota.percentage),
        quota.resets_at.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
