#![allow(clippy::unwrap_used)]
// Loading, saving and state-file round trips against temp directories.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use rendezvous_config::{
    Config, ConfigError, FileTokenStore, TokenBackend, clear_session, load_config_from,
    load_session, save_config_to, save_session, session_path, to_client_config, token_store,
};
use rendezvous_core::{MemoryTokenStore, SessionProfile, TokenStore};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.backend_url, "http://localhost:6050");
    assert_eq!(cfg.token.key, "jwt");
    assert_eq!(cfg.token.backend, TokenBackend::Keyring);
    assert_eq!(cfg.routes.public, vec!["/".to_string(), "/login".to_string()]);
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
backend_url = "https://books.example"
timeout = 15
logout_timeout = 3

[token]
backend = "file"

[routes]
public = ["/", "/login", "/share"]
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.token.backend, TokenBackend::File);
    assert_eq!(cfg.token.key, "jwt");
    assert_eq!(cfg.routes.login, "/login");

    let client = to_client_config(&cfg).unwrap();
    assert_eq!(client.base_url.as_str(), "https://books.example/");
    assert_eq!(client.timeout, Some(Duration::from_secs(15)));
    assert_eq!(client.logout_timeout, Duration::from_secs(3));
    assert_eq!(client.guard.public_routes.len(), 3);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub").join("config.toml");
    let cfg = Config {
        backend_url: "https://books.example".into(),
        state_dir: Some(dir.path().join("state")),
        ..Config::default()
    };

    save_config_to(&cfg, &path).unwrap();
    assert_eq!(load_config_from(&path).unwrap(), cfg);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "logout_timeout = \"soon\"").unwrap();
    assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
}

#[test]
fn file_backend_lives_in_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config {
        state_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    cfg.token.backend = TokenBackend::File;

    let store = token_store(&cfg);
    store.store(&"t1".to_string().into()).unwrap();

    let direct = FileTokenStore::new(dir.path().join("jwt"));
    assert_eq!(direct.load().unwrap().unwrap().expose_secret(), "t1");
}

#[test]
fn session_profile_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        state_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let path = session_path(&cfg);
    assert_eq!(load_session(&path).unwrap(), None);

    let profile = SessionProfile {
        pseudo: Some("alice".into()),
        uuid: Some("u1".into()),
        email: Some("alice@example.com".into()),
        is_public: true,
        share_link: Some("s1".into()),
    };
    save_session(&path, &profile).unwrap();
    assert_eq!(load_session(&path).unwrap(), Some(profile));

    clear_session(&path).unwrap();
    assert_eq!(load_session(&path).unwrap(), None);
}

#[test]
fn rehydrated_profile_does_not_authenticate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    save_session(
        &path,
        &SessionProfile {
            pseudo: Some("alice".into()),
            ..SessionProfile::default()
        },
    )
    .unwrap();

    let restored = load_session(&path).unwrap().unwrap();
    let tokens = MemoryTokenStore::new();
    assert!(tokens.load().unwrap().is_none());
    assert_eq!(restored.pseudo.as_deref(), Some("alice"));
    assert!(!std::fs::read_to_string(&path).unwrap().contains("authenticated"));
}

#[test]
fn corrupt_session_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(
        load_session(&path),
        Err(ConfigError::SessionState { .. })
    ));
}
