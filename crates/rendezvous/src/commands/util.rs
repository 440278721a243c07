//! Shared helpers for command handlers.

use std::io::{BufRead, IsTerminal};

use secrecy::SecretString;

use rendezvous_core::Context;

use crate::error::CliError;

/// Fail early when no access token is stored.
pub fn require_login(ctx: &Context) -> Result<(), CliError> {
    if ctx.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Environment variable consulted before prompting for a login password.
pub const PASSWORD_ENV: &str = "RENDEZVOUS_PASSWORD";

/// Password for an existing account: the first line of stdin when
/// `from_stdin` is set, else `$RENDEZVOUS_PASSWORD`, else a prompt.
pub fn read_password(prompt: &str, from_stdin: bool) -> Result<SecretString, CliError> {
    if !from_stdin {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            return non_empty(password);
        }
    }
    read_secret(prompt, from_stdin)
}

/// A new password: one stdin line, or prompted twice and compared.
pub fn read_new_password(from_stdin: bool) -> Result<SecretString, CliError> {
    use secrecy::ExposeSecret;

    let first = read_secret("New password: ", from_stdin)?;
    if from_stdin {
        return Ok(first);
    }
    let second = read_secret("Repeat new password: ", false)?;
    if first.expose_secret() != second.expose_secret() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    Ok(first)
}

fn read_secret(prompt: &str, from_stdin: bool) -> Result<SecretString, CliError> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password(prompt).map_err(prompt_err)?
    };
    non_empty(password)
}

fn non_empty(password: String) -> Result<SecretString, CliError> {
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}
