mod cli;
mod commands;
mod error;
mod output;

use std::path::Path;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use rendezvous_config::{
    Config, clear_session, load_config, load_session, save_session, session_path,
    to_client_config, token_store,
};
use rendezvous_core::Context;

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "rendezvous", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a backend connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // All other commands run against a context
        cmd => {
            let cfg = resolve_config(&mut cli.global)?;
            let ctx = Context::new(to_client_config(&cfg)?, token_store(&cfg))?;

            let state_file = session_path(&cfg);
            restore_session(&ctx, &state_file);

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &ctx, &cli.global).await;

            persist_session(&ctx, &state_file);
            result
        }
    }
}

/// Load the config file + environment, then apply CLI overrides.
fn resolve_config(global: &mut cli::GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    if let Some(ref url) = global.backend_url {
        cfg.backend_url.clone_from(url);
    }
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.output, true).ok();
    }
    Ok(cfg)
}

/// Rehydrate the profile saved by the previous invocation. A missing or
/// unreadable state file just means a fresh profile.
fn restore_session(ctx: &Context, path: &Path) {
    match load_session(path) {
        Ok(Some(profile)) => ctx.session().restore(profile),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring session state file"),
    }
}

fn persist_session(ctx: &Context, path: &Path) {
    let result = if ctx.session().is_authenticated() {
        save_session(path, &ctx.session().profile())
    } else {
        clear_session(path)
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "could not write session state file");
    }
}
