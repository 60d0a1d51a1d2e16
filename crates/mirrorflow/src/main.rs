mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::DeploymentConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mirrorflow")]
#[command(about = "Provision cross-region replicated volumes", long_about = None)]
struct Cli {
    /// Deployment file (default: mirrorflow.yaml, env MIRRORFLOW_CONFIG)
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision accounts, pools, volumes, and the replication link
    Up,
    /// Delete everything in reverse creation order
    Down {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the provisioning state of every planned resource
    Status,
    /// Check the deployment file without calling the API
    Validate,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    if matches!(cli.command, Commands::Version) {
        println!("mirrorflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let path = DeploymentConfig::find(cli.file.as_deref())?;
    let config = DeploymentConfig::load(&path)?;

    match cli.command {
        Commands::Up => commands::up::handle(&config).await?,
        Commands::Down { yes } => commands::down::handle(&config, yes).await?,
        Commands::Status => commands::status::handle(&config).await?,
        Commands::Validate => commands::validate::handle(&config)?,
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
