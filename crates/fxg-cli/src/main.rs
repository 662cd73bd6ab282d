//! `fxg` -- CLI binary for the FxG applicant relay.
//!
//! Provides the following subcommands:
//!
//! - `fxg serve` -- Connect the bot and serve the webhook API.
//! - `fxg config` -- Show the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;

/// FxG applicant relay CLI.
#[derive(Parser)]
#[command(name = "fxg", about = "FxG applicant relay", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve the webhook API.
    Serve(commands::serve::ServeArgs),

    /// Show the resolved configuration (secrets redacted).
    Config {
        /// Only print this section (e.g. "server", "categories").
        section: Option<String>,

        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Config { section, config } => {
            let cfg = commands::load_config(config.as_deref()).await?;
            match section {
                Some(name) => commands::config_cmd::config_section(&cfg, &name),
                None => commands::config_cmd::config_show(&cfg),
            }
        }
    }

    Ok(())
}
