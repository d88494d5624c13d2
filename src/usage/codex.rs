//! Codex quota from its local session logs.
//!
//! The codex CLI appends JSON lines to `~/.codex/sessions/**/*.jsonl`; some
//! of them carry a `payload.rate_limits` snapshot with a primary (short)
//! and secondary (weekly) window.  The newest snapshot wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::live::identity::{chatgpt_plan_type, codex_id_claims};
use crate::live::{read_json, LiveLocations};

pub const SOURCE: &str = "codex_session_files";

/// Where to check usage when no snapshot is found.
pub const DASHBOARD_URL: &str = "https://chatgpt.com/settings";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodexWindow {
    pub used_percent: f64,
    pub remaining_percent: f64,
    pub window_minutes: Option<u64>,
    pub resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodexLimits {
    pub primary: CodexWindow,
    pub secondary: CodexWindow,
}

/// Codex usage. `limits` is `None` when no session log had both windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodexUsage {
    pub plan_type: String,
    pub limits: Option<CodexLimits>,
    pub source: &'static str,
}

#[derive(Debug, Deserialize)]
struct RawWindow {
    #[serde(default)]
    used_percent: f64,
    #[serde(default)]
    window_minutes: Option<u64>,
    #[serde(default)]
    resets_in_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRateLimits {
    primary: Option<RawWindow>,
    secondary: Option<RawWindow>,
}

/// The latest rate-limit snapshot found in a session log.
#[derive(Debug, Clone)]
pub struct RateLimitEvent {
    pub rate_limits: Value,
    pub timestamp: Option<String>,
}

/// Usage of the live codex login, with `now` standing in for the event
/// time of snapshots that carry no timestamp.
///
/// `None` when there is no live `auth.json`.
pub fn codex_usage(live: &LiveLocations, now: DateTime<Utc>) -> Option<CodexUsage> {
    let auth = read_json(&live.codex_auth())?;
    let plan_type = codex_id_claims(&auth)
        .as_ref()
        .and_then(chatgpt_plan_type)
        .unwrap_or("unknown")
        .to_string();

    let limits = latest_rate_limits(&live.codex_sessions()).and_then(|event| to_limits(&event, now));

    Some(CodexUsage {
        plan_type,
        limits,
        source: SOURCE,
    })
}

/// Scan the newest session log, last line first, for a rate-limit
/// snapshot. Lines that are not JSON are skipped.
pub fn latest_rate_limits(sessions_dir: &Path) -> Option<RateLimitEvent> {
    let newest = newest_session_file(sessions_dir)?;
    debug!(path = %newest.display(), "reading codex session log");
    let content = fs::read_to_string(&newest).ok()?;

    content
        .lines()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .find_map(|line| {
            let rate_limits = line.get("payload")?.get("rate_limits")?;
            if rate_limits.is_null() {
                return None;
            }
            Some(RateLimitEvent {
                rate_limits: rate_limits.clone(),
                timestamp: line
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
}

/// The most recently modified `*.jsonl` below `dir`.
fn newest_session_file(dir: &Path) -> Option<PathBuf> {
    let mut files = Vec::new();
    collect_session_files(dir, &mut files);
    files
        .into_iter()
        .max_by_key(|(_, mtime)| *mtime)
        .map(|(path, _)| path)
}

fn collect_session_files(dir: &Path, out: &mut Vec<(PathBuf, SystemTime)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if meta.is_dir() {
            collect_session_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "jsonl") {
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            out.push((path, mtime));
        }
    }
}

fn to_limits(event: &RateLimitEvent, now: DateTime<Utc>) -> Option<CodexLimits> {
    let raw: RawRateLimits = serde_json::from_value(event.rate_limits.clone()).ok()?;
    let event_time = event
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(now);

    Some(CodexLimits {
        primary: to_window(raw.primary?, event_time),
        secondary: to_window(raw.secondary?, event_time),
    })
}

fn to_window(raw: RawWindow, event_time: DateTime<Utc>) -> CodexWindow {
    let resets_at = raw
        .resets_in_seconds
        .filter(|secs| secs.is_finite() && *secs != 0.0)
        .and_then(|secs| reset_time(event_time, secs));

    CodexWindow {
        used_percent: raw.used_percent,
        remaining_percent: 100.0 - raw.used_percent,
        window_minutes: raw.window_minutes,
        resets_at,
    }
}

/// `event_time` shifted by `secs`, or `None` when the offset does not fit
/// in a timestamp.
fn reset_time(event_time: DateTime<Utc>, secs: f64) -> Option<DateTime<Utc>> {
    let millis = (secs * 1000.0).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    event_time.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}
