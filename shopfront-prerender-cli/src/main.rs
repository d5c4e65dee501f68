//! Shopfront Prerender CLI
//!
//! Developer tooling over the prerender engine: print the static rule set,
//! check URLs against the exclusion filter and preview dynamic batches.
//! Nothing here talks to a browser.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "shopfront-prerender", version, about)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Storefront origin that relative URL arguments resolve against
    #[arg(long, global = true, default_value = "https://shop.example")]
    origin: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the static speculation rules document
    Rules {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check URLs against the exclusion filter
    Check {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show which static rule, if any, would pick up each URL
    Match {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Print the selector and exclusion table
    Config,

    /// Preview the explicit-list batch injected for these URLs
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command, &cli.origin) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, origin: &Url) -> Result<(), CliError> {
    match command {
        Commands::Rules { pretty } => commands::rules::run(pretty),
        Commands::Check { urls } => commands::check::run(origin, &urls),
        Commands::Match { urls } => commands::matching::run(origin, &urls),
        Commands::Config => commands::config::run(),
        Commands::Batch { urls } => commands::batch::run(origin, &urls),
    }
}
