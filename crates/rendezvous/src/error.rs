//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use rendezvous_config::ConfigError;
use rendezvous_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(rendezvous::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Override the URL with --backend-url or RENDEZVOUS_BACKEND_URL."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(rendezvous::auth_failed),
        help("Log in again with: rendezvous login")
    )]
    AuthFailed { message: String },

    #[error("Not logged in")]
    #[diagnostic(
        code(rendezvous::not_logged_in),
        help("Log in first with: rendezvous login")
    )]
    NotLoggedIn,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(rendezvous::not_found),
        help("Run: rendezvous {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("{operation} failed: {message}")]
    #[diagnostic(code(rendezvous::request_failed))]
    RequestFailed { operation: String, message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rendezvous::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(rendezvous::config),
        help("Inspect the effective configuration with: rendezvous config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rendezvous::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(rendezvous::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotLoggedIn => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// A failed store operation, described by the store's last error.
    pub fn request(operation: &str, message: Option<String>) -> Self {
        Self::RequestFailed {
            operation: operation.into(),
            message: message.unwrap_or_else(|| "the backend rejected the request".into()),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthFailure { message } => CliError::AuthFailed { message },
            CoreError::NetworkFailure { reason } => CliError::ConnectionFailed { reason },
            CoreError::ValidationFailure { message } => CliError::RequestFailed {
                operation: "Request".into(),
                message,
            },
            CoreError::ServerFailure { .. } => CliError::RequestFailed {
                operation: "Request".into(),
                message: err.to_string(),
            },
            CoreError::NotFound { message } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: message,
                list_command: "books list".into(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
