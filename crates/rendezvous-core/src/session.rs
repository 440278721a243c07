// ── Session manager ──
//
// Owns authentication state and the persisted access token. The token
// itself lives in the API client's `TokenStore`; this module keeps the
// in-memory `Session` consistent with it. Every operation ends in a
// single write to the state channel.

use std::sync::Arc;
use std::time::Duration;

use rendezvous_api::{BackendClient, Credentials, Registration};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::stream::StateStream;

// ── Session state ────────────────────────────────────────────────

/// The authenticated session as seen by consumers.
///
/// `authenticated` is true exactly when a non-empty access token is
/// persisted. Only [`SessionManager`] writes this state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub pseudo: Option<String>,
    pub uuid: Option<String>,
    pub email: Option<String>,
    pub is_public: bool,
    pub share_link: Option<String>,
    pub last_error: Option<String>,
}

impl Session {
    /// The persistable part of the session.
    pub fn profile(&self) -> SessionProfile {
        SessionProfile {
            pseudo: self.pseudo.clone(),
            uuid: self.uuid.clone(),
            email: self.email.clone(),
            is_public: self.is_public,
            share_link: self.share_link.clone(),
        }
    }
}

/// Profile fields persisted across restarts. Never carries the token or
/// the `authenticated` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionProfile {
    pub pseudo: Option<String>,
    pub uuid: Option<String>,
    pub email: Option<String>,
    pub is_public: bool,
    pub share_link: Option<String>,
}

// ── SessionManager ───────────────────────────────────────────────

/// Login, logout, session check, sharing and password flows.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Operations never return
/// errors: failures become `false`, `None`, or `Session::last_error`.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: BackendClient,
    state: watch::Sender<Session>,
    logout_timeout: Duration,
}

impl SessionManager {
    /// Create a manager whose initial `authenticated` flag reflects
    /// whatever token the client's store already holds.
    pub fn new(api: BackendClient, logout_timeout: Duration) -> Self {
        let authenticated = match api.tokens().load() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                false
            }
        };
        let (state, _) = watch::channel(Session {
            authenticated,
            ..Session::default()
        });

        Self {
            inner: Arc::new(SessionInner {
                api,
                state,
                logout_timeout,
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().authenticated
    }

    pub fn subscribe(&self) -> StateStream<Session> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// The persistable profile of the current session.
    pub fn profile(&self) -> SessionProfile {
        self.inner.state.borrow().profile()
    }

    /// Rehydrate profile fields saved by a previous process.
    ///
    /// `authenticated` is left alone: it always derives from the token store.
    pub fn restore(&self, profile: SessionProfile) {
        self.inner.state.send_modify(|s| {
            s.pseudo = profile.pseudo;
            s.uuid = profile.uuid;
            s.email = profile.email;
            s.is_public = profile.is_public;
            s.share_link = profile.share_link;
        });
    }

    // ── Token ────────────────────────────────────────────────────

    /// Persist `token` (or clear it) together with the derived
    /// `authenticated` flag.
    pub fn set_token(&self, token: Option<SecretString>) {
        let present = self.persist_token(token.as_ref());
        self.inner.state.send_modify(|s| s.authenticated = present);
    }

    pub fn clear_token(&self) {
        self.set_token(None);
    }

    /// Write the token store; returns whether a token is now present.
    /// A failed write counts as "no token".
    fn persist_token(&self, token: Option<&SecretString>) -> bool {
        let tokens = self.inner.api.tokens();
        let result = match token {
            Some(t) if !t.expose_secret().is_empty() => tokens.store(t).map(|()| true),
            _ => tokens.clear().map(|()| false),
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, "token store write failed");
            false
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Exchange credentials for a token. On failure the token is
    /// cleared and `last_error` holds a readable message.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        match self.inner.api.login(credentials).await {
            Ok(resp) => {
                let present = self.persist_token(Some(&resp.token));
                let email = resp.email.or_else(|| Some(credentials.email.clone()));
                info!(pseudo = ?resp.pseudo, "logged in");
                self.inner.state.send_modify(|s| {
                    s.authenticated = present;
                    s.pseudo = resp.pseudo;
                    s.uuid = resp.uuid;
                    s.email = email;
                    s.last_error = (!present).then(|| "could not persist access token".into());
                });
                present
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "login failed");
                let present = self.persist_token(None);
                self.inner.state.send_modify(|s| {
                    s.authenticated = present;
                    s.last_error = Some(err.to_string());
                });
                false
            }
        }
    }

    /// Create an account. Session state is untouched: the new user
    /// still has to log in.
    pub async fn register(&self, registration: &Registration) -> bool {
        match self.inner.api.register(registration).await {
            Ok(()) => {
                info!(username = %registration.username, "account created");
                true
            }
            Err(e) => {
                warn!(error = %CoreError::from(e), "registration failed");
                false
            }
        }
    }

    /// Validate the persisted token against the backend.
    ///
    /// Without a token no request is made. Profile fields are not
    /// refreshed on success; any failure clears the token.
    pub async fn check_auth(&self) -> bool {
        let has_token = match self.inner.api.tokens().load() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                false
            }
        };
        if !has_token {
            self.inner.state.send_modify(|s| s.authenticated = false);
            return false;
        }

        match self.inner.api.current_user().await {
            Ok(_) => {
                debug!("session token accepted");
                self.inner.state.send_modify(|s| s.authenticated = true);
                true
            }
            Err(e) => {
                warn!(error = %CoreError::from(e), "session check failed, clearing token");
                self.clear_token();
                false
            }
        }
    }

    /// Best-effort server logout, then unconditional local reset.
    pub async fn logout(&self) {
        match tokio::time::timeout(self.inner.logout_timeout, self.inner.api.logout()).await {
            Ok(Ok(())) => debug!("server logout acknowledged"),
            Ok(Err(e)) => debug!(error = %e, "server logout failed"),
            Err(_) => debug!(
                timeout_secs = self.inner.logout_timeout.as_secs(),
                "server logout timed out"
            ),
        }

        let present = self.persist_token(None);
        self.inner.state.send_replace(Session {
            authenticated: present,
            ..Session::default()
        });
        info!("logged out");
    }

    // ── Sharing ──────────────────────────────────────────────────

    /// Toggle public sharing of the collection; flips `is_public` on success.
    pub async fn change_public_visibility(&self) -> bool {
        match self.inner.api.change_public_visibility().await {
            Ok(()) => {
                self.inner.state.send_modify(|s| s.is_public = !s.is_public);
                true
            }
            Err(e) => {
                warn!(error = %CoreError::from(e), "visibility change failed");
                false
            }
        }
    }

    /// Fetch the sharing flag and share link. `None` on failure.
    pub async fn get_public_visibility(&self) -> Option<bool> {
        match self.inner.api.public_visibility().await {
            Ok(vis) => {
                self.inner.state.send_modify(|s| {
                    s.is_public = vis.public;
                    s.share_link = vis.share_link;
                });
                Some(vis.public)
            }
            Err(e) => {
                warn!(error = %CoreError::from(e), "visibility fetch failed");
                None
            }
        }
    }

    // ── Password flows ───────────────────────────────────────────

    pub async fn password_change(&self, old: &SecretString, new: &SecretString) -> bool {
        report("password change", self.inner.api.change_password(old, new).await)
    }

    pub async fn send_reset_password_email(&self, email: &str) -> bool {
        report("reset email", self.inner.api.forgot_password(email).await)
    }

    pub async fn reset_password(&self, token: &str, password: &SecretString) -> bool {
        report("password reset", self.inner.api.reset_password(token, password).await)
    }

    pub async fn verify_reset_token(&self, token: &str) -> bool {
        report("reset token check", self.inner.api.verify_reset_token(token).await)
    }
}

fn report(operation: &str, result: Result<(), rendezvous_api::Error>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(operation, error = %CoreError::from(e), "request failed");
            false
        }
    }
}
