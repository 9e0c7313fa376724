//! Guestwire CLI
//!
//! Single binary for working with a guest list service:
//! - One-shot reads (list, show)
//! - A live feed over the sync engine (watch)
//! - Seating edits through the validated mutation path (assign)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guestwire::commands;

#[derive(Parser)]
#[command(name = "guestwire")]
#[command(author, version, about = "Guest list dashboard and sync client")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// REST base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Push-channel URL (overrides config)
    #[arg(long, global = true)]
    channel_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List guests with RSVP and seating
    List {
        /// Show contact and invitation-progress columns
        #[arg(short, long)]
        long: bool,
    },

    /// Show one guest's canonical record
    Show {
        /// Invitation ID
        id: String,
    },

    /// Stream live changes and connectivity
    Watch,

    /// Assign a guest to a table
    Assign {
        /// Invitation ID
        id: String,
        /// Table number
        #[arg(short, long)]
        table: u32,
        /// Seat within the table
        #[arg(short, long)]
        seat: Option<u32>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration and apply command-line overrides
    let mut config = commands::load_or_default(cli.config.as_ref());
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(channel_url) = cli.channel_url {
        config.channel_url = channel_url;
    }

    match cli.command {
        Commands::List { long } => {
            commands::list_command(&config, long).await?;
        }

        Commands::Show { id } => {
            commands::show_command(&config, &id).await?;
        }

        Commands::Watch => {
            commands::watch_command(&config).await?;
        }

        Commands::Assign { id, table, seat } => {
            commands::assign_command(&config, &id, table, seat).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config_show(cli.config.as_ref())?;
            }
            ConfigAction::Path => {
                commands::config_path(cli.config.as_ref())?;
            }
        },
    }

    Ok(())
}
