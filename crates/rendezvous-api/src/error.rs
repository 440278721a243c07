use thiserror::Error;

use crate::auth::TokenStoreError;

/// Top-level error type for the `rendezvous-api` crate.
///
/// Covers every failure mode of the backend contract: authentication,
/// payload validation, missing resources, transport, and decoding.
/// `rendezvous-core` maps these into its domain taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Bad credentials, or a missing/expired/invalid bearer token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Request rejected ────────────────────────────────────────────
    /// The backend rejected the payload (HTTP 400 / 422).
    #[error("Request rejected (HTTP {status}): {message}")]
    Validation { status: u16, message: String },

    /// The addressed resource does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API requests: {0}")]
    InvalidBaseUrl(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Credentials ─────────────────────────────────────────────────
    /// Reading or writing the persisted access token failed.
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl Error {
    /// Returns `true` if this error means the session is not (or no
    /// longer) valid.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(e) if e.status().is_none())
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
