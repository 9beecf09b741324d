mod config_cmd;
mod stats;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config_cmd::ConfigCommands;

#[derive(Debug, Parser)]
#[command(name = "reachwatch-cli")]
#[command(about = "Creator statistics from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect statistics for every configured profile
    Stats {
        /// Print the snapshot as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Inspect or edit the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = reachwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Stats { json } => stats::run_stats(&config, json).await,
        Commands::Config {
            command: ConfigCommands::Show,
        } => config_cmd::run_config_show(&config).await,
        Commands::Config {
            command: ConfigCommands::Set { assignment },
        } => config_cmd::run_config_set(&config, &assignment).await,
    }
}
