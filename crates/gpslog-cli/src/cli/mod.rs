//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use gpslog_core::config::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "gpslog")]
#[command(version = "1.0")]
#[command(about = "Terminal GPS logger")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Credentials shared by every command that talks to the store.
#[derive(clap::Args, Debug, Clone)]
struct CredentialArgs {
    /// Account email
    #[arg(long, env = "GPSLOG_EMAIL")]
    email: String,

    /// Account password
    #[arg(long, env = "GPSLOG_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// One-shot capture: sign in, read the last known position, store it
    Capture {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Grant the location permission without prompting
        #[arg(long)]
        allow_location: bool,
    },

    /// List the stored coordinate records
    Records {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Print the effective configuration as TOML
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // default to the interactive UI
    let Some(command) = cli.command else {
        return gpslog_tui::run(&config).await;
    };

    match command {
        Commands::Capture {
            credentials,
            allow_location,
        } => {
            commands::capture::run(
                &config,
                &credentials.email,
                &credentials.password,
                allow_location,
            )
            .await
        }

        Commands::Records { credentials } => {
            commands::records::run(&config, &credentials.email, &credentials.password).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Show => commands::config::show(&config),
        },
    }
}
