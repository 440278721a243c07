//! Login, registration, logout, session check and route handlers.

use dialoguer::Input;
use serde::Serialize;

use secrecy::ExposeSecret;

use rendezvous_core::{Context, Credentials, Navigation, Registration, Session};

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Session view ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    authenticated: bool,
    pseudo: Option<&'a str>,
    uuid: Option<&'a str>,
    email: Option<&'a str>,
    is_public: bool,
    share_link: Option<&'a str>,
}

impl<'a> From<&'a Session> for SessionView<'a> {
    fn from(s: &'a Session) -> Self {
        Self {
            authenticated: s.authenticated,
            pseudo: s.pseudo.as_deref(),
            uuid: s.uuid.as_deref(),
            email: s.email.as_deref(),
            is_public: s.is_public,
            share_link: s.share_link.as_deref(),
        }
    }
}

fn detail(s: &SessionView<'_>) -> String {
    [
        format!("Pseudo:     {}", s.pseudo.unwrap_or("-")),
        format!("Email:      {}", s.email.unwrap_or("-")),
        format!("UUID:       {}", s.uuid.unwrap_or("-")),
        format!("Public:     {}", s.is_public),
        format!("Share link: {}", s.share_link.unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn login(ctx: &Context, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let email = match args.email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    let password = util::read_password("Password: ", args.password_stdin)?;
    let credentials = Credentials::new(email, password.expose_secret());

    if !ctx.session().login(&credentials).await {
        let message = ctx
            .session()
            .snapshot()
            .last_error
            .unwrap_or_else(|| "login rejected".into());
        return Err(CliError::AuthFailed { message });
    }

    let session = ctx.session().snapshot();
    let color = output::should_color(global.color);
    output::print_status(
        &format!(
            "{} as {}",
            output::success("Logged in", color),
            session
                .pseudo
                .as_deref()
                .or(session.email.as_deref())
                .unwrap_or("(unknown)")
        ),
        global.quiet,
    );
    Ok(())
}

pub async fn register(
    ctx: &Context,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = util::read_new_password(args.password_stdin)?;
    let registration = Registration {
        username: args.username,
        email: args.email,
        password,
    };

    if !ctx.session().register(&registration).await {
        return Err(CliError::request("Registration", None));
    }
    output::print_status(
        "Account created. Log in with: rendezvous login",
        global.quiet,
    );
    Ok(())
}

pub async fn logout(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.logout().await;
    output::print_status("Logged out", global.quiet);
    Ok(())
}

pub async fn whoami(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(ctx)?;
    if !ctx.session().check_auth().await {
        return Err(CliError::AuthFailed {
            message: "Session expired".into(),
        });
    }

    let session = ctx.session().snapshot();
    let view = SessionView::from(&session);
    let out = output::render_single(global.format(), &view, detail, |s| {
        s.pseudo.or(s.email).unwrap_or_default().to_owned()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn route(ctx: &Context, path: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let line = match ctx.navigate(path).await {
        Navigation::Proceed => format!("{} {path}", output::success("proceed", color)),
        Navigation::Redirect { to } => {
            format!("{} {path} -> {to}", output::warning("redirect", color))
        }
    };
    output::print_output(&line, global.quiet);
    Ok(())
}
