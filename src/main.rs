//! Maestro CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use maestro::agent::{Coordinator, CoordinatorOptions};
use maestro::cli::errors::format_error_help;
use maestro::cli::{AuthCommands, ChatArgs, Cli, Commands};
use maestro::config::MaestroConfig;
use maestro::error::Result;
use maestro::music::SpotifyClient;
use maestro::provider::{create_provider, LanguageModel};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match MaestroConfig::from_env() {
        Ok(config) => match cli.command_or_default() {
            Commands::Auth(auth_args) => match auth_args.command {
                AuthCommands::Login(args) => {
                    maestro::cli::auth::handle_login(&config, !args.no_browser).await
                }
                AuthCommands::Status => maestro::cli::auth::handle_status(&config).await,
                AuthCommands::Logout => maestro::cli::auth::handle_logout(&config).await,
            },
            Commands::Chat(args) => handle_chat(config, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}

async fn handle_chat(mut config: MaestroConfig, args: ChatArgs) -> Result<()> {
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(max) = args.max_iterations {
        config = config.with_max_iterations(max);
    }
    config.validate()?;

    let model: LanguageModel = config.model.parse()?;
    let provider = create_provider(&model, &config)?;
    provider.check_connection().await?;
    tracing::info!(%model, "model backend ready");

    let auth = Arc::new(config.spotify_auth()?);
    let client = Arc::new(
        SpotifyClient::new(auth, config.http_timeout)?.with_api_url(&config.spotify_api_url),
    );

    let mut options = CoordinatorOptions::from(&config);
    options.settings.temperature = args.temperature;
    let coordinator = Coordinator::new(provider, client, options)?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    maestro::cli::shell::run_shell(&coordinator, stdin, tokio::io::stdout(), shutdown).await
}
