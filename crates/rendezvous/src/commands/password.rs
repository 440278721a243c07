//! Password change and reset handlers.

use rendezvous_core::Context;

use crate::cli::{GlobalOpts, PasswordArgs, PasswordCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    ctx: &Context,
    args: PasswordArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = ctx.session();
    match args.command {
        PasswordCommand::Change { password_stdin } => {
            util::require_login(ctx)?;
            let old = util::read_password("Current password: ", password_stdin)?;
            let new = util::read_new_password(password_stdin)?;
            if !session.password_change(&old, &new).await {
                return Err(CliError::request("Password change", None));
            }
            output::print_status("Password changed", global.quiet);
        }

        PasswordCommand::Forgot { email } => {
            if !session.send_reset_password_email(&email).await {
                return Err(CliError::request("Reset email", None));
            }
            output::print_status(
                &format!("If {email} has an account, a reset link is on its way"),
                global.quiet,
            );
        }

        PasswordCommand::Reset {
            token,
            password_stdin,
        } => {
            let password = util::read_new_password(password_stdin)?;
            if !session.reset_password(&token, &password).await {
                return Err(CliError::request("Password reset", None));
            }
            output::print_status(
                "Password reset. Log in with: rendezvous login",
                global.quiet,
            );
        }

        PasswordCommand::Verify { token } => {
            if !session.verify_reset_token(&token).await {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "reset token is invalid or expired".into(),
                });
            }
            output::print_output("valid", global.quiet);
        }
    }
    Ok(())
}
