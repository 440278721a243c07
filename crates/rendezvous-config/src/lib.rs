//! Shared configuration for Books Rendezvous tools.
//!
//! TOML + environment configuration (figment), access-token persistence
//! (OS keyring or a private file), the session profile state file, and
//! translation to `rendezvous_core::ClientConfig`.

mod state;
mod token;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use rendezvous_core::{ClientConfig, DEFAULT_BACKEND_URL, GuardConfig, TokenStore};

pub use state::{SESSION_FILE, clear_session, load_session, save_session, session_path};
pub use token::{FileTokenStore, KEYRING_SERVICE, KeyringTokenStore};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "RENDEZVOUS_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("unreadable session state in {path}: {source}")]
    SessionState {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Request timeout in seconds. Absent or 0 disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Upper bound on the server logout call, in seconds.
    #[serde(default = "default_logout_timeout")]
    pub logout_timeout: u64,

    /// Where the token file and session state live. Defaults to the
    /// platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Default output format for the CLI ("table" or "json").
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub routes: RoutesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            timeout: None,
            logout_timeout: default_logout_timeout(),
            state_dir: None,
            output: default_output(),
            token: TokenConfig::default(),
            routes: RoutesConfig::default(),
        }
    }
}

/// Where the access token is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenConfig {
    #[serde(default)]
    pub backend: TokenBackend,

    /// Fixed key naming the single token slot.
    #[serde(default = "default_token_key")]
    pub key: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            backend: TokenBackend::default(),
            key: default_token_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// OS secret store (Keychain, Secret Service, Credential Manager).
    #[default]
    Keyring,
    /// `0600` file inside the state directory.
    File,
}

/// Navigation guard routes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoutesConfig {
    #[serde(default = "default_public_routes")]
    pub public: Vec<String>,

    #[serde(default = "default_login_route")]
    pub login: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public: default_public_routes(),
            login: default_login_route(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.into()
}
fn default_logout_timeout() -> u64 {
    10
}
fn default_output() -> String {
    "table".into()
}
fn default_token_key() -> String {
    "jwt".into()
}
fn default_public_routes() -> Vec<String> {
    GuardConfig::default().public_routes
}
fn default_login_route() -> String {
    GuardConfig::default().login_route
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "booksrendezvous", "rendezvous")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path: `$RENDEZVOUS_CONFIG`, else XDG /
/// platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || home_fallback(&[".config", "rendezvous", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding the token file and session state.
pub fn state_dir(cfg: &Config) -> PathBuf {
    if let Some(ref dir) = cfg.state_dir {
        return dir.clone();
    }
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "rendezvous"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config layered as: defaults, then `path` (if present), then
/// `RENDEZVOUS_*` variables (`__` separates nested keys, e.g.
/// `RENDEZVOUS_TOKEN__BACKEND=file`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RENDEZVOUS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig`, validating the backend URL and routes.
pub fn to_client_config(cfg: &Config) -> Result<ClientConfig, ConfigError> {
    let base_url: Url = cfg
        .backend_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "backend_url".into(),
            reason: format!("invalid URL '{}': {e}", cfg.backend_url),
        })?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend_url".into(),
            reason: format!("expected an http(s) URL, got '{}'", cfg.backend_url),
        });
    }

    if !cfg.routes.login.starts_with('/') {
        return Err(ConfigError::Validation {
            field: "routes.login".into(),
            reason: format!("expected an absolute path, got '{}'", cfg.routes.login),
        });
    }

    let mut client = ClientConfig::new(base_url);
    client.timeout = cfg.timeout.filter(|&s| s > 0).map(Duration::from_secs);
    client.logout_timeout = Duration::from_secs(cfg.logout_timeout);
    client.guard = GuardConfig {
        public_routes: cfg.routes.public.clone(),
        login_route: cfg.routes.login.clone(),
    };
    Ok(client)
}

/// The token store selected by `token.backend`.
pub fn token_store(cfg: &Config) -> Arc<dyn TokenStore> {
    match cfg.token.backend {
        TokenBackend::Keyring => Arc::new(KeyringTokenStore::new(&cfg.token.key)),
        TokenBackend::File => Arc::new(FileTokenStore::new(state_dir(cfg).join(&cfg.token.key))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_translate_to_default_client_config() {
        let client = to_client_config(&Config::default()).unwrap();
        assert_eq!(client.base_url.as_str(), "http://localhost:6050/");
        assert_eq!(client.timeout, None);
        assert_eq!(client.logout_timeout, Duration::from_secs(10));
        assert_eq!(client.guard, GuardConfig::default());
    }

    #[test]
    fn zero_timeout_means_disabled() {
        let cfg = Config {
            timeout: Some(0),
            ..Config::default()
        };
        assert_eq!(to_client_config(&cfg).unwrap().timeout, None);

        let cfg = Config {
            timeout: Some(5),
            ..Config::default()
        };
        assert_eq!(
            to_client_config(&cfg).unwrap().timeout,
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn rejects_non_http_backend() {
        let cfg = Config {
            backend_url: "ftp://books.example".into(),
            ..Config::default()
        };
        assert!(matches!(
            to_client_config(&cfg),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_relative_login_route() {
        let mut cfg = Config::default();
        cfg.routes.login = "login".into();
        assert!(to_client_config(&cfg).is_err());
    }

    #[test]
    fn explicit_state_dir_wins() {
        let cfg = Config {
            state_dir: Some(PathBuf::from("/tmp/rendezvous-state")),
            ..Config::default()
        };
        assert_eq!(state_dir(&cfg), PathBuf::from("/tmp/rendezvous-state"));
    }
}
