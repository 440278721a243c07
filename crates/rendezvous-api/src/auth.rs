use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Which authentication strategy a particular API call uses.
///
/// Marker enum (no data) -- the bearer token itself lives in a
/// [`TokenStore`]. Useful for branching on auth flow without carrying
/// secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Bearer <token>` read from the token store, plus cookies.
    Bearer,
    /// No bearer header (login, registration, password reset, public lists).
    Anonymous,
}

/// Email + password pair exchanged for an access token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Account creation request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

// ── Token persistence ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// The platform secret store refused the operation.
    #[error("token store backend error: {0}")]
    Backend(String),

    #[error("token store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single persisted slot holding the access token.
///
/// Implementations live outside the in-memory session model so the
/// token survives process restarts. There is exactly one slot per
/// store; concurrent processes sharing a slot are not coordinated.
pub trait TokenStore: Send + Sync {
    /// Read the current token. Empty values are reported as `None`.
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError>;

    /// Persist `token`, replacing any previous value.
    fn store(&self, token: &SecretString) -> Result<(), TokenStoreError>;

    /// Remove the token. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token slot. Used by tests and short-lived consumers
/// that do not need the token to outlive the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(SecretString::from(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        let guard = self.slot.read().expect("token lock poisoned");
        Ok(guard
            .as_ref()
            .filter(|t| !t.expose_secret().is_empty())
            .cloned())
    }

    fn store(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        *self.slot.write().expect("token lock poisoned") = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.write().expect("token lock poisoned") = None;
        Ok(())
    }
}
