use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ftgp_infrastructure::ConfigService;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "ftgp")]
#[command(about = "FTGP CLI - deposits, tokens and loans on the FTGP ledger", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive session (default)
    Repl,
    /// Print the account's deposits and exit
    Deposits,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    tracing::debug!("[ftgp] Using config {}", config_service.path().display());

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => commands::repl::run(&config_service).await?,
        Commands::Deposits => commands::deposits::list(&config_service).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_service)?,
            ConfigAction::Init { force } => commands::config::init(&config_service, force)?,
        },
    }

    Ok(())
}
