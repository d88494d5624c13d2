//! Claude quota estimate from the OAuth usage endpoint.
//!
//! The endpoint only reports utilization percentages per window.  Absolute
//! numbers come from a fixed per-tier limit table.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{CredSwapError, Result};
use crate::live::identity::{claude_access_token, claude_subscription};
use crate::live::{read_json, LiveLocations};

pub const DEFAULT_USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const BETA_HEADER: &str = "anthropic-beta";
const BETA_VALUE: &str = "oauth-2025-04-20";

/// Source tag of the estimate.
pub const SOURCE: &str = "live_api";

/// Subscription tier, selecting the limit table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Pro,
    Max5,
    Max,
    Max20,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Pro => "pro",
            Tier::Max5 => "max5",
            Tier::Max => "max",
            Tier::Max20 => "max20",
        }
    }

    /// `(five_hour, seven_day)` limits.
    pub fn limits(self) -> (i64, i64) {
        match self {
            Tier::Pro => (44_000, 308_000),
            Tier::Max5 | Tier::Max => (88_000, 616_000),
            Tier::Max20 => (220_000, 1_540_000),
        }
    }

    /// Resolve a subscription string.
    ///
    /// Exact tier names win. Otherwise anything mentioning `max` is `max20`
    /// when it also contains `20`, else `max`. Everything else is `pro`.
    pub fn resolve(subscription: Option<&str>) -> Self {
        let sub = subscription.unwrap_or("pro").to_lowercase();
        match sub.as_str() {
            "pro" => Tier::Pro,
            "max5" => Tier::Max5,
            "max" => Tier::Max,
            "max20" => Tier::Max20,
            s if s.contains("max") && s.contains("20") => Tier::Max20,
            s if s.contains("max") => Tier::Max,
            _ => Tier::Pro,
        }
    }
}

/// Raw response of the usage endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeTelemetry {
    pub five_hour: WindowUtilization,
    pub seven_day: WindowUtilization,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowUtilization {
    /// Percent of the window used, e.g. `7.0`.
    pub utilization: f64,
    #[serde(default)]
    pub resets_at: Option<String>,
}

/// Estimated quota of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowQuota {
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    pub percentage: f64,
    pub resets_at: Option<String>,
}

impl WindowQuota {
    pub fn from_utilization(window: &WindowUtilization, limit: i64) -> Self {
        let used = (window.utilization / 100.0 * limit as f64).round() as i64;
        Self {
            used,
            limit,
            remaining: limit - used,
            percentage: window.utilization,
            resets_at: window.resets_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaudeUsage {
    pub five_hour: WindowQuota,
    pub seven_day: WindowQuota,
    pub subscription_type: String,
    pub source: &'static str,
}

/// Turn telemetry into absolute quota figures for `tier`.
pub fn estimate(telemetry: &ClaudeTelemetry, tier: Tier) -> ClaudeUsage {
    let (five_hour, seven_day) = tier.limits();
    ClaudeUsage {
        five_hour: WindowQuota::from_utilization(&telemetry.five_hour, five_hour),
        seven_day: WindowQuota::from_utilization(&telemetry.seven_day, seven_day),
        subscription_type: tier.as_str().to_string(),
        source: SOURCE,
    }
}

/// Something that can fetch usage telemetry for an access token.
pub trait TelemetrySource {
    fn fetch(&self, access_token: &str) -> Result<ClaudeTelemetry>;
}

/// Blocking HTTP client for the usage endpoint.
///
/// One request, no retry. Any transport error, timeout, non-2xx status or
/// malformed body is `RemoteUnavailable`.
pub struct UsageClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl UsageClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for UsageClient {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_ENDPOINT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl TelemetrySource for UsageClient {
    fn fetch(&self, access_token: &str) -> Result<ClaudeTelemetry> {
        let mut resp = self
            .agent
            .get(&self.endpoint)
            .header("Authorization", &format!("Bearer {access_token}"))
            .header(BETA_HEADER, BETA_VALUE)
            .call()
            .map_err(|e| {
                warn!(error = %e, "usage request failed");
                CredSwapError::RemoteUnavailable(e.to_string())
            })?;

        debug!(status = resp.status().as_u16(), "usage response");

        resp.body_mut()
            .read_json::<ClaudeTelemetry>()
            .map_err(|e| CredSwapError::RemoteUnavailable(format!("malformed usage response: {e}")))
    }
}

/// Fetch and estimate the usage of the live claude login.
pub fn claude_usage(live: &LiveLocations, source: &dyn TelemetrySource) -> Result<ClaudeUsage> {
    let credentials = read_json(&live.claude_credentials())
        .ok_or_else(|| CredSwapError::LiveCredentialNotFound("credentials".into()))?;
    let token = claude_access_token(&credentials)
        .ok_or_else(|| CredSwapError::RemoteUnavailable("no access token in credentials".into()))?;

    let telemetry = source.fetch(token)?;
    Ok(estimate(&telemetry, tier_of(&credentials)))
}

fn tier_of(credentials: &Value) -> Tier {
    Tier::resolve(claude_subscription(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn telemetry(five: f64, seven: f64) -> ClaudeTelemetry {
        serde_json::from_value(json!({
            "five_hour": {"utilization": five, "resets_at": "2025-01-01T05:00:00Z"},
            "seven_day": {"utilization": seven, "resets_at": null}
        }))
        .unwrap()
    }

    #[test]
    fn tier_resolution() {
        assert_eq!(Tier::resolve(None), Tier::Pro);
        assert_eq!(Tier::resolve(Some("PRO")), Tier::Pro);
        assert_eq!(Tier::resolve(Some("max5")), Tier::Max5);
        assert_eq!(Tier::resolve(Some("Claude Max 20x")), Tier::Max20);
        assert_eq!(Tier::resolve(Some("max_5x")), Tier::Max);
        assert_eq!(Tier::resolve(Some("team")), Tier::Pro);
        // Any "20" counts once "max" is present.
        assert_eq!(Tier::resolve(Some("max-2024")), Tier::Max20);
    }

    #[test]
    fn pro_estimate() {
        let usage = estimate(&telemetry(7.0, 50.0), Tier::Pro);
        assert_eq!(usage.five_hour.used, 3080);
        assert_eq!(usage.five_hour.limit, 44_000);
        assert_eq!(usage.five_hour.remaining, 40_920);
        assert_eq!(usage.five_hour.percentage, 7.0);
        assert_eq!(
            usage.five_hour.resets_at.as_deref(),
            Some("2025-01-01T05:00:00Z")
        );
        assert_eq!(usage.seven_day.used, 154_000);
        assert!(usage.seven_day.resets_at.is_none());
        assert_eq!(usage.source, "live_api");
    }

    #[test]
    fn used_is_rounded() {
        let usage = estimate(&telemetry(0.001, 0.0), Tier::Max20);
        assert_eq!(usage.five_hour.used, 2);
        assert_eq!(usage.seven_day.used, 0);
        assert_eq!(usage.seven_day.remaining, 1_540_000);
    }

    struct Fixed(ClaudeTelemetry);

    impl TelemetrySource for Fixed {
        fn fetch(&self, access_token: &str) -> Result<ClaudeTelemetry> {
            assert_eq!(access_token, "tok");
            Ok(self.0.clone())
        }
    }

    #[test]
    fn usage_reads_token_and_tier_from_live_credentials() {
        let home = TempDir::new().unwrap();
        let live = LiveLocations::new(home.path());
        fs::create_dir_all(home.path().join(".claude")).unwrap();
        fs::write(
            live.claude_credentials(),
            json!({"claudeAiOauth": {"accessToken": "tok", "subscriptionType": "max"}}).to_string(),
        )
        .unwrap();

        let usage = claude_usage(&live, &Fixed(telemetry(10.0, 10.0))).unwrap();
        assert_eq!(usage.subscription_type, "max");
        assert_eq!(usage.five_hour.used, 8_800);
    }

    #[test]
    fn missing_token_is_unavailable() {
        let home = TempDir::new().unwrap();
        let live = LiveLocations::new(home.path());
        fs::create_dir_all(home.path().join(".claude")).unwrap();
        fs::write(live.claude_credentials(), "{}").unwrap();

        let err = claude_usage(&live, &Fixed(telemetry(0.0, 0.0))).unwrap_err();
        assert!(matches!(err, CredSwapError::RemoteUnavailable(_)));
    }

    #[test]
    fn unreachable_endpoint_is_unavailable() {
        let client = UsageClient::new("http://127.0.0.1:9/usage", Duration::from_secs(2));
        assert!(matches!(
            client.fetch("tok"),
            Err(CredSwapError::RemoteUnavailable(_))
        ));
    }
}
