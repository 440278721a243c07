//! Command handlers, one module per command group.

pub mod books;
pub mod config_cmd;
pub mod password;
pub mod session;
pub mod share;
pub mod stats;
pub mod util;

use rendezvous_core::Context;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a context-bound command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => session::login(ctx, args, global).await,
        Command::Register(args) => session::register(ctx, args, global).await,
        Command::Logout => session::logout(ctx, global).await,
        Command::Whoami => session::whoami(ctx, global).await,
        Command::Route { path } => session::route(ctx, &path, global).await,
        Command::Books(args) => books::handle(ctx, args, global).await,
        Command::Stats => stats::handle_stats(ctx, global).await,
        Command::Achievements(args) => stats::handle_achievements(ctx, args, global).await,
        Command::Share(args) => share::handle(ctx, args, global).await,
        Command::Password(args) => password::handle(ctx, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a backend context".into(),
        )),
    }
}
