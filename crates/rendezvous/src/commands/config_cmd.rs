//! Config subcommand handlers.

use dialoguer::{Input, Select};

use rendezvous_config::{
    Config, TokenBackend, config_path, load_config, save_config, state_dir, to_client_config,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

fn render_toml(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Internal(format!("config rendering: {e}")))
}

/// Walk through the settings a new install needs, starting from `cfg`.
fn wizard(mut cfg: Config) -> Result<Config, CliError> {
    cfg.backend_url = Input::new()
        .with_prompt("Backend URL")
        .default(cfg.backend_url)
        .interact_text()
        .map_err(util::prompt_err)?;

    let backends = &[
        "System keyring (recommended)",
        "Private file in the data directory",
    ];
    let selection = Select::new()
        .with_prompt("Where should the access token be stored?")
        .items(backends)
        .default(match cfg.token.backend {
            TokenBackend::Keyring => 0,
            TokenBackend::File => 1,
        })
        .interact()
        .map_err(util::prompt_err)?;
    cfg.token.backend = if selection == 0 {
        TokenBackend::Keyring
    } else {
        TokenBackend::File
    };

    let formats = &["table", "json", "json-compact", "plain"];
    let current = formats.iter().position(|f| *f == cfg.output).unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Default output format")
        .items(formats)
        .default(current)
        .interact()
        .map_err(util::prompt_err)?;
    cfg.output = formats.get(selection).copied().unwrap_or("table").into();

    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config_path();
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    global.yes,
                )?
            {
                return Ok(());
            }

            let cfg = wizard(load_config()?)?;
            // Reject values the client would refuse at startup.
            to_client_config(&cfg)?;
            let path = save_config(&cfg)?;
            output::print_status(
                &format!("Configuration saved to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = load_config()?;
            if let Some(ref url) = global.backend_url {
                cfg.backend_url.clone_from(url);
            }
            let out = match global.format() {
                OutputFormat::Table | OutputFormat::Plain => render_toml(&cfg)?,
                format => output::render_single(format, &cfg, |_| String::new(), |_| String::new()),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let cfg = load_config()?;
            let out = format!(
                "config: {}\nstate:  {}",
                config_path().display(),
                state_dir(&cfg).display()
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
