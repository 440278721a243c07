// ── Core error types ──
//
// Domain-level errors from rendezvous-core. Consumers never see HTTP
// status codes or JSON parse failures directly: the
// `From<rendezvous_api::Error>` impl translates transport-layer errors
// into the failure kinds the stores reason about.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// Store operations do not propagate these; they fold them into a
/// boolean result, an absent value, or a readable `last_error` string.
/// The type is still public so `PendingWrite::settled` and consumers can
/// branch on the kind of failure.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    /// Bad credentials, or a missing/expired token.
    #[error("{message}")]
    AuthFailure { message: String },

    // ── Transport ────────────────────────────────────────────────────
    /// No response from the backend (connection refused, DNS, timeout).
    #[error("Cannot reach backend: {reason}")]
    NetworkFailure { reason: String },

    // ── Request rejected ─────────────────────────────────────────────
    /// The backend refused the request itself (a 4xx other than 401/404).
    #[error("{message}")]
    ValidationFailure { message: String },

    /// The backend failed while handling a well-formed request (5xx).
    #[error("Backend error (HTTP {status}): {message}")]
    ServerFailure { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rendezvous_api::Error> for CoreError {
    fn from(err: rendezvous_api::Error) -> Self {
        use rendezvous_api::Error as Api;

        match err {
            Api::Authentication { message } => CoreError::AuthFailure { message },
            Api::Validation { message, .. } => CoreError::ValidationFailure { message },
            Api::NotFound { message } => CoreError::NotFound { message },
            Api::Api { status, message } => classify(status, message),
            Api::Transport(ref e) => match err.status() {
                Some(status) => classify(status, e.to_string()),
                None => CoreError::NetworkFailure {
                    reason: e.to_string(),
                },
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Base URL cannot carry API paths: {url}"),
            },
            Api::Deserialization { message, .. } => {
                CoreError::Internal(format!("Unexpected backend response: {message}"))
            }
            Api::TokenStore(e) => CoreError::Internal(format!("Token store: {e}")),
        }
    }
}

/// Split a non-success status between server faults and rejections.
fn classify(status: u16, message: String) -> CoreError {
    if status >= 500 {
        CoreError::ServerFailure { status, message }
    } else {
        CoreError::ValidationFailure {
            message: format!("{message} (HTTP {status})"),
        }
    }
}
