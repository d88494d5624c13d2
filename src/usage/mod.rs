//! Quota estimates for the live logins.

pub mod claude;
pub mod codex;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::live::LiveLocations;

pub use claude::{ClaudeUsage, TelemetrySource, Tier, UsageClient, WindowQuota};
pub use codex::{CodexLimits, CodexUsage, CodexWindow};

/// Usage of both tools. `None` means unavailable.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub claude: Option<ClaudeUsage>,
    pub codex: Option<CodexUsage>,
}

/// Collect usage for both tools. Failures on one side never affect the
/// other.
pub fn usage_report(live: &LiveLocations, source: &dyn TelemetrySource) -> UsageReport {
    let claude = match claude::claude_usage(live, source) {
        Ok(usage) => Some(usage),
        Err(e) => {
            info!(error = %e, "claude usage unavailable");
            None
        }
    };

    UsageReport {
        claude,
        codex: codex::codex_usage(live, Utc::now()),
    }
}
