//! Discourse command-line tool.
//!
//! Runs the webhook relay, drives the user API key handshake and makes
//! simple API calls.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{relay, site, user_api_key};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Discourse - forum API client and webhook relay
#[derive(Parser)]
#[command(name = "discourse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Site URL, e.g. https://forum.example.com
    #[arg(long, global = true, env = "DISCOURSE_URL")]
    pub url: Option<String>,

    #[command(flatten)]
    pub credentials: commands::Credentials,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Receive webhook deliveries and route them to handlers
    Relay(relay::RelayArgs),

    /// User API key handshake
    UserApiKey(user_api_key::UserApiKeyArgs),

    /// Show site info
    Site(site::SiteArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "discourse=debug,discourse_client=debug,discourse_webhook=debug,tower_http=debug,info"
    } else {
        "discourse=info,discourse_client=info,discourse_webhook=info,warn"
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
                ),
        )
        .init();

    let ctx = commands::Context {
        url: cli.url,
        credentials: cli.credentials,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Relay(args) => relay::run(args, &ctx).await,
        Commands::UserApiKey(args) => user_api_key::run(args, &ctx).await,
        Commands::Site(args) => site::run(args, &ctx).await,
    }
}
