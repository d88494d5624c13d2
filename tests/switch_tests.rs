//! save/switch between live files and the vault.

use std::fs;

use credswap::crypto::encrypt;
use credswap::errors::CredSwapError;
use credswap::live::{backup_path, LiveLocations};
use credswap::password::PasswordManager;
use credswap::session::Session;
use credswap::switcher::AccountSwitcher;
use credswap::vault::{ProfileKind, Service, VaultStore};
use tempfile::TempDir;

struct Env {
    _dir: TempDir,
    store: VaultStore,
    live: LiveLocations,
    passwords: PasswordManager,
}

fn env() -> Env {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let home = dir.path().join("home");
    fs::create_dir_all(home.join(".claude")).unwrap();
    fs::create_dir_all(home.join(".codex")).unwrap();
    Env {
        store: VaultStore::new(data.join("accounts")),
        live: LiveLocations::new(&home),
        passwords: PasswordManager::new(data.join("password.json")),
        _dir: dir,
    }
}

// Deliberately odd formatting: switch must restore these bytes exactly.
const WORK_AUTH: &str = "{\n\t\"tokens\" : { \"id_token\": \"a.b.c\" },\n  \"OPENAI_API_KEY\": null\n}\n";
const HOME_AUTH: &str = r#"{"tokens":{"id_token":"x.y.z"}}"#;

#[test]
fn save_then_switch_is_byte_identical_plaintext() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let session = Session::new();

    fs::write(env.live.codex_auth(), WORK_AUTH).unwrap();
    switcher.save(&session, Service::Codex, "work").unwrap();

    fs::write(env.live.codex_auth(), HOME_AUTH).unwrap();
    switcher.save(&session, Service::Codex, "home").unwrap();

    switcher.switch(&session, Service::Codex, "work").unwrap();
    assert_eq!(fs::read_to_string(env.live.codex_auth()).unwrap(), WORK_AUTH);

    switcher.switch(&session, Service::Codex, "home").unwrap();
    assert_eq!(fs::read_to_string(env.live.codex_auth()).unwrap(), HOME_AUTH);
}

#[test]
fn save_then_switch_is_byte_identical_encrypted() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let mut session = env.passwords.session();
    env.passwords.setup(&env.store, &mut session, "pw-1234").unwrap();

    let creds = "{ \"claudeAiOauth\": {\"accessToken\": \"t1\"} }";
    let config = "{\"oauthAccount\":{\"emailAddress\":\"w@example.com\"},\"numStartups\":3}";
    fs::write(env.live.claude_credentials(), creds).unwrap();
    fs::write(env.live.claude_config_primary(), config).unwrap();
    switcher.save(&session, Service::Claude, "work").unwrap();

    fs::write(env.live.claude_credentials(), "{}").unwrap();
    fs::write(
        env.live.claude_config_primary(),
        r#"{"oauthAccount":{"emailAddress":"other@example.com"}}"#,
    )
    .unwrap();

    switcher.switch(&session, Service::Claude, "work").unwrap();
    assert_eq!(fs::read_to_string(env.live.claude_credentials()).unwrap(), creds);
    assert_eq!(fs::read_to_string(env.live.claude_config_primary()).unwrap(), config);
}

#[test]
fn switch_backs_up_previous_live_files() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let session = Session::new();

    fs::write(env.live.codex_auth(), WORK_AUTH).unwrap();
    switcher.save(&session, Service::Codex, "work").unwrap();
    fs::write(env.live.codex_auth(), HOME_AUTH).unwrap();

    let backups = switcher.switch(&session, Service::Codex, "work").unwrap();
    let expected = backup_path(&env.live.codex_auth());
    assert_eq!(backups, vec![expected.clone()]);
    assert_eq!(fs::read_to_string(&expected).unwrap(), HOME_AUTH);

    // Single generation: the next switch overwrites the backup.
    switcher.switch(&session, Service::Codex, "work").unwrap();
    assert_eq!(fs::read_to_string(&expected).unwrap(), WORK_AUTH);
}

#[test]
fn switch_with_no_live_file_writes_no_backup() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let session = Session::new();

    fs::write(env.live.codex_auth(), WORK_AUTH).unwrap();
    switcher.save(&session, Service::Codex, "work").unwrap();
    fs::remove_file(env.live.codex_auth()).unwrap();

    assert!(switcher.switch(&session, Service::Codex, "work").unwrap().is_empty());
    assert_eq!(fs::read_to_string(env.live.codex_auth()).unwrap(), WORK_AUTH);
}

#[test]
fn locked_session_cannot_switch_protected_vault() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let mut session = env.passwords.session();
    env.passwords.setup(&env.store, &mut session, "pw-1234").unwrap();

    fs::write(env.live.codex_auth(), WORK_AUTH).unwrap();
    switcher.save(&session, Service::Codex, "work").unwrap();
    fs::write(env.live.codex_auth(), HOME_AUTH).unwrap();

    let locked = env.passwords.session();
    assert!(matches!(
        switcher.switch(&locked, Service::Codex, "work"),
        Err(CredSwapError::AuthenticationRequired)
    ));
    assert_eq!(fs::read_to_string(env.live.codex_auth()).unwrap(), HOME_AUTH);
}

#[test]
fn undecryptable_blob_keeps_live_files_but_writes_backups() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let mut session = env.passwords.session();
    env.passwords.setup(&env.store, &mut session, "pw-1234").unwrap();

    fs::write(env.live.claude_credentials(), r#"{"claudeAiOauth":{"accessToken":"w"}}"#).unwrap();
    fs::write(
        env.live.claude_config_fallback(),
        r#"{"oauthAccount":{"emailAddress":"w@example.com"}}"#,
    )
    .unwrap();
    switcher.save(&session, Service::Claude, "work").unwrap();

    // Config blob sealed under some other password.
    let config_blob = env
        .store
        .resolve_path(Service::Claude, "work", ProfileKind::Config)
        .unwrap();
    let foreign = encrypt("{}", "other-pw").unwrap().to_json().unwrap();
    env.store.write_raw(&config_blob, &foreign).unwrap();

    let live_creds = r#"{"a":1}"#;
    let live_config = r#"{"oauthAccount":{"emailAddress":"h@example.com"}}"#;
    fs::write(env.live.claude_credentials(), live_creds).unwrap();
    fs::write(env.live.claude_config_fallback(), live_config).unwrap();

    assert!(matches!(
        switcher.switch(&session, Service::Claude, "work"),
        Err(CredSwapError::DecryptionFailed)
    ));

    assert_eq!(fs::read_to_string(env.live.claude_credentials()).unwrap(), live_creds);
    assert_eq!(fs::read_to_string(env.live.claude_config_fallback()).unwrap(), live_config);
    assert_eq!(
        fs::read_to_string(backup_path(&env.live.claude_credentials())).unwrap(),
        live_creds
    );
    assert_eq!(
        fs::read_to_string(backup_path(&env.live.claude_config_fallback())).unwrap(),
        live_config
    );
}

#[test]
fn claude_switch_uses_fallback_config_when_primary_lacks_account() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let session = Session::new();

    let config = r#"{"oauthAccount":{"emailAddress":"w@example.com"}}"#;
    fs::write(env.live.claude_credentials(), "{}").unwrap();
    fs::write(env.live.claude_config_fallback(), config).unwrap();
    switcher.save(&session, Service::Claude, "work").unwrap();

    fs::write(env.live.claude_config_primary(), r#"{"theme":"dark"}"#).unwrap();
    fs::write(env.live.claude_config_fallback(), "{}").unwrap();

    switcher.switch(&session, Service::Claude, "work").unwrap();
    assert_eq!(fs::read_to_string(env.live.claude_config_fallback()).unwrap(), config);
    assert_eq!(
        fs::read_to_string(env.live.claude_config_primary()).unwrap(),
        r#"{"theme":"dark"}"#
    );
}

#[test]
fn list_shows_saved_names() {
    let env = env();
    let switcher = AccountSwitcher::new(&env.store, &env.live);
    let session = Session::new();
    fs::write(env.live.codex_auth(), "{}").unwrap();
    for name in ["zeta", "alpha", "../mid"] {
        switcher.save(&session, Service::Codex, name).unwrap();
    }
    assert_eq!(switcher.list(Service::Codex).unwrap(), vec!["alpha", "mid", "zeta"]);
}
