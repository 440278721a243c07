//! Clap derive structures for the `rendezvous` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use rendezvous_core::BookStatus;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rendezvous -- track your reading from the command line
#[derive(Debug, Parser)]
#[command(
    name = "rendezvous",
    version,
    about = "Track your Books Rendezvous collection from the command line",
    long_about = "Log in to a Books Rendezvous backend, manage your book collection,\n\
        and read your reading statistics and achievements.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend URL (overrides the config file)
    #[arg(long, short = 'b', env = "RENDEZVOUS_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "RENDEZVOUS_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the access token
    Login(LoginArgs),

    /// Create an account (log in afterwards)
    Register(RegisterArgs),

    /// End the session and forget the stored token
    Logout,

    /// Validate the stored token and show the session profile
    Whoami,

    /// Check whether a route may be entered with the current session
    Route {
        /// Route path, e.g. /library
        path: String,
    },

    /// Manage your book collection
    #[command(alias = "b")]
    Books(BooksArgs),

    /// Show reading statistics
    Stats,

    /// Show achievements
    Achievements(AchievementsArgs),

    /// Public sharing of your collection
    Share(ShareArgs),

    /// Password change and reset flows
    Password(PasswordArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long, short = 'u')]
    pub username: String,

    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Books ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BooksCommand,
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// List your collection
    #[command(alias = "ls")]
    List {
        /// Only show books with this status
        #[arg(long, short = 's')]
        status: Option<BookStatus>,
    },

    /// Show one book
    #[command(alias = "get")]
    Show {
        /// Book ID
        id: String,
    },

    /// Add a book
    Add(BookAddArgs),

    /// Update fields of a book
    Update(BookUpdateArgs),

    /// Remove a book
    #[command(alias = "rm")]
    Remove {
        /// Book ID
        id: String,
    },

    /// List another reader's shared collection
    Public {
        /// Share link identifier
        public_id: String,
    },
}

#[derive(Debug, Args)]
pub struct BookAddArgs {
    /// Book title
    pub title: String,

    /// Author (repeatable)
    #[arg(long, short = 'a')]
    pub author: Vec<String>,

    /// Reading status
    #[arg(long, short = 's', default_value = "to-read")]
    pub status: BookStatus,

    /// Catalog volume ID
    #[arg(long)]
    pub google_id: Option<String>,

    /// Genre (repeatable)
    #[arg(long, short = 'g')]
    pub genre: Vec<String>,

    /// Page count
    #[arg(long)]
    pub pages: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BookUpdateArgs {
    /// Book ID
    pub id: String,

    #[arg(long, short = 's')]
    pub status: Option<BookStatus>,

    /// Rating from 0 to 5
    #[arg(long, short = 'r', value_parser = clap::value_parser!(u8).range(0..=5))]
    pub rating: Option<u8>,

    /// Reading progress in percent
    #[arg(long, short = 'p')]
    pub progress: Option<f64>,

    #[arg(long)]
    pub comment: Option<String>,

    #[arg(long)]
    pub favorite: Option<bool>,

    #[arg(long)]
    pub abandoned: Option<bool>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

// ── Achievements ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AchievementsArgs {
    /// Include achievements not unlocked yet
    #[arg(long, short = 'a')]
    pub all: bool,
}

// ── Sharing ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShareArgs {
    #[command(subcommand)]
    pub command: ShareCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Show whether the collection is public and its share link
    Status,
    /// Flip public sharing on or off
    Toggle,
}

// ── Password ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[command(subcommand)]
    pub command: PasswordCommand,
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Change the password of the logged-in account
    Change {
        /// Read the current then the new password from stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Email a password-reset link
    Forgot {
        /// Account email
        email: String,
    },
    /// Set a new password using a reset token
    Reset {
        /// Token from the reset email
        token: String,

        /// Read the new password from stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Check that a reset token is still valid
    Verify {
        /// Token from the reset email
        token: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,
    /// Display the effective configuration
    Show,
    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_parses_kebab_case() {
        let cli = Cli::try_parse_from(["rendezvous", "books", "list", "--status", "to-read"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Command::Books(BooksArgs {
                command: BooksCommand::List { status },
            }) => assert_eq!(status, Some(BookStatus::ToRead)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rating_is_bounded() {
        assert!(
            Cli::try_parse_from(["rendezvous", "books", "update", "b1", "--rating", "6"]).is_err()
        );
    }
}
