// ── Session state file ──
//
// The persistable session profile, stored as JSON next to the token so
// a new process can rehydrate it. `authenticated` is never stored.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rendezvous_core::SessionProfile;

use crate::{Config, ConfigError, state_dir};

pub const SESSION_FILE: &str = "session.json";

pub fn session_path(cfg: &Config) -> PathBuf {
    state_dir(cfg).join(SESSION_FILE)
}

/// Read a saved profile. A missing file is `Ok(None)`.
pub fn load_session(path: &Path) -> Result<Option<SessionProfile>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::SessionState {
            path: path.display().to_string(),
            source,
        })
}

/// Write `profile` wholesale, replacing any previous file.
pub fn save_session(path: &Path, profile: &SessionProfile) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(profile).map_err(|source| {
        ConfigError::SessionState {
            path: path.display().to_string(),
            source,
        }
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn clear_session(path: &Path) -> Result<(), ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
