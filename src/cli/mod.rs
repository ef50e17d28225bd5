//! Command line interface for Maestro.

pub mod auth;
pub mod errors;
pub mod shell;

use clap::{Parser, Subcommand};

/// Maestro, a Spotify assistant driven by a local language model
#[derive(Parser, Debug)]
#[command(name = "maestro", version, about = "Talk to Spotify through a team of LLM agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive assistant (default)
    Chat(ChatArgs),
    /// Spotify account authorization
    Auth(AuthArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Authorize Maestro to control playback on your account
    Login(LoginArgs),
    /// Show whether a user token is stored
    Status,
    /// Delete the stored user token
    Logout,
}

/// Arguments for `maestro auth login`.
#[derive(Parser, Debug, Default)]
pub struct LoginArgs {
    /// Print the authorization URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug, Default)]
pub struct ChatArgs {
    /// Model to use (format: provider:model, e.g. ollama:llama3.2)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum model calls per agent run
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,
}

impl Cli {
    /// The command to run, `chat` when none was given.
    pub fn command_or_default(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Chat(ChatArgs::default()))
    }
}
