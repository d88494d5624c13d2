//! Who is logged in right now, read from the live files.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

use super::{read_json, LiveLocations};

const UNKNOWN: &str = "Unknown";

/// JWT claim namespace carrying the ChatGPT plan.
const OPENAI_AUTH_CLAIM: &str = "https://api.openai.com/auth";

/// The account a tool is currently logged in with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveAccount {
    pub email: String,
    pub plan: String,
}

/// Active accounts for both tools; `None` means no active login.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CurrentAccounts {
    pub claude: Option<ActiveAccount>,
    pub codex: Option<ActiveAccount>,
}

/// Read the active account of each tool.
///
/// Claude counts as logged in when its config has an `oauthAccount`;
/// codex when `auth.json` parses.  Missing details show as `Unknown`.
pub fn current_accounts(live: &LiveLocations) -> CurrentAccounts {
    CurrentAccounts {
        claude: claude_account(live),
        codex: codex_account(live),
    }
}

fn claude_account(live: &LiveLocations) -> Option<ActiveAccount> {
    let config = read_json(&live.resolve_claude_config())?;
    let account = config.get("oauthAccount")?;

    let email = non_empty_str(account.get("emailAddress")).unwrap_or(UNKNOWN);
    let credentials = read_json(&live.claude_credentials());
    let plan = credentials
        .as_ref()
        .and_then(claude_subscription)
        .unwrap_or(UNKNOWN);

    Some(ActiveAccount {
        email: email.to_string(),
        plan: plan.to_string(),
    })
}

fn codex_account(live: &LiveLocations) -> Option<ActiveAccount> {
    let auth = read_json(&live.codex_auth())?;
    let claims = codex_id_claims(&auth);

    let email = claims
        .as_ref()
        .and_then(|c| non_empty_str(c.get("email")))
        .unwrap_or(UNKNOWN);
    let plan = claims
        .as_ref()
        .and_then(chatgpt_plan_type)
        .unwrap_or(UNKNOWN);

    Some(ActiveAccount {
        email: email.to_string(),
        plan: plan.to_string(),
    })
}

/// `claudeAiOauth.subscriptionType` from a parsed credentials file.
pub(crate) fn claude_subscription(credentials: &Value) -> Option<&str> {
    non_empty_str(credentials.pointer("/claudeAiOauth/subscriptionType"))
}

/// `claudeAiOauth.accessToken` from a parsed credentials file.
pub(crate) fn claude_access_token(credentials: &Value) -> Option<&str> {
    non_empty_str(credentials.pointer("/claudeAiOauth/accessToken"))
}

/// Claims of `tokens.id_token` from a parsed codex `auth.json`.
pub(crate) fn codex_id_claims(auth: &Value) -> Option<Value> {
    let token = auth.pointer("/tokens/id_token")?.as_str()?;
    decode_jwt_payload(token)
}

/// The ChatGPT plan claim of a decoded id-token.
pub(crate) fn chatgpt_plan_type(claims: &Value) -> Option<&str> {
    non_empty_str(claims.get(OPENAI_AUTH_CLAIM)?.get("chatgpt_plan_type"))
}

/// Decode the payload segment of a JWT without verifying it.
///
/// Accepts both the base64url alphabet and the standard one, padded or
/// not.
pub fn decode_jwt_payload(token: &str) -> Option<Value> {
    let segment = token.split('.').nth(1)?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD_NO_PAD.decode(segment))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    /// Build an unsigned JWT around `claims`.
    pub(crate) fn fake_jwt(claims: &Value) -> String {
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("eyJhbGciOiJub25lIn0.{payload}.sig")
    }

    #[test]
    fn decodes_payload() {
        let token = fake_jwt(&json!({"email": "dev@example.com"}));
        let claims = decode_jwt_payload(&token).unwrap();
        assert_eq!(claims["email"], "dev@example.com");
    }

    #[test]
    fn malformed_tokens_decode_to_none() {
        assert!(decode_jwt_payload("no-dots").is_none());
        assert!(decode_jwt_payload("a.!!!.c").is_none());
        assert!(decode_jwt_payload("a.bm90IGpzb24.c").is_none());
    }

    #[test]
    fn no_live_files_means_no_accounts() {
        let home = TempDir::new().unwrap();
        let current = current_accounts(&LiveLocations::new(home.path()));
        assert!(current.claude.is_none());
        assert!(current.codex.is_none());
    }

    #[test]
    fn reads_both_accounts() {
        let home = TempDir::new().unwrap();
        let live = LiveLocations::new(home.path());
        fs::create_dir_all(home.path().join(".claude")).unwrap();
        fs::create_dir_all(home.path().join(".codex")).unwrap();

        fs::write(
            live.claude_config_fallback(),
            r#"{"oauthAccount":{"emailAddress":"c@example.com"}}"#,
        )
        .unwrap();
        fs::write(
            live.claude_credentials(),
            r#"{"claudeAiOauth":{"subscriptionType":"max"}}"#,
        )
        .unwrap();
        let token = fake_jwt(&json!({
            "email": "x@example.com",
            "https://api.openai.com/auth": {"chatgpt_plan_type": "plus"}
        }));
        fs::write(
            live.codex_auth(),
            json!({"tokens": {"id_token": token}}).to_string(),
        )
        .unwrap();

        let current = current_accounts(&live);
        assert_eq!(
            current.claude,
            Some(ActiveAccount {
                email: "c@example.com".into(),
                plan: "max".into()
            })
        );
        assert_eq!(
            current.codex,
            Some(ActiveAccount {
                email: "x@example.com".into(),
                plan: "plus".into()
            })
        );
    }

    #[test]
    fn missing_details_are_unknown() {
        let home = TempDir::new().unwrap();
        let live = LiveLocations::new(home.path());
        fs::create_dir_all(home.path().join(".codex")).unwrap();
        fs::write(live.codex_auth(), "{}").unwrap();
        fs::write(live.claude_config_fallback(), r#"{"oauthAccount":{}}"#).unwrap();

        let current = current_accounts(&live);
        let claude = current.claude.unwrap();
        assert_eq!(claude.email, "Unknown");
        assert_eq!(claude.plan, "Unknown");
        assert_eq!(current.codex.unwrap().email, "Unknown");
    }
}
