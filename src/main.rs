mod cmd;
mod config;
mod context;
mod display;
mod domain;
mod drafts;
mod error;
mod infra;
mod logging;
mod services;
mod store;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::tickets::{self, CreateArgs, ListArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::http::HttpSupportApi;

#[derive(Parser)]
#[command(
    name = "support-desk",
    author,
    version,
    about = "Terminal client for the support ticket service"
)]
struct Cli {
    /// Log requests and state changes to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickets, optionally filtered.
    List(ListArgs),
    /// Submit a new ticket, with a suggested category and priority.
    Create(CreateArgs),
    /// Move a ticket to its next status.
    Advance(AdvanceArgs),
    /// Ask the service to suggest a category and priority for a description.
    Classify(ClassifyArgs),
    /// Show the ticket dashboard.
    Stats,
    /// Interactive session with the list, the form and the dashboard.
    Shell,
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct AdvanceArgs {
    /// Ticket id.
    id: String,
}

#[derive(Args)]
struct ClassifyArgs {
    description: String,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::List(args) => tickets::list(&build_context()?, args).await,
        Commands::Create(args) => tickets::create(&build_context()?, args).await,
        Commands::Advance(args) => tickets::advance(&build_context()?, args.id).await,
        Commands::Classify(args) => {
            tickets::classify(&build_context()?, args.description).await
        }
        Commands::Stats => tickets::stats(&build_context()?).await,
        Commands::Shell => cmd::shell::run(&build_context()?).await,
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    let api = Arc::new(HttpSupportApi::new(
        &config.api_base_url,
        config.request_timeout,
    )?);
    Ok(AppContext::new(config, api))
}
