//! Shopcheck CLI - Main Entry Point
//!
//! Runs the storefront UI checks, the API checks and the load scripts,
//! writes reports and exits non-zero when anything failed.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{load, run};

/// Shopcheck - end-to-end checks for the demo storefront and its APIs
#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run UI and API tests
    Run(run::RunArgs),

    /// Run a load script
    Load(load::LoadArgs),

    /// List the bundled load scripts
    Scripts,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let success = match cli.command {
        Commands::Run(args) => run::execute(args, cli.format).await?,
        Commands::Load(args) => load::execute(args, cli.format).await?,
        Commands::Scripts => {
            load::list(cli.format);
            true
        }
        Commands::Version => {
            println!("shopcheck v{}", shopcheck_common::VERSION);
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
