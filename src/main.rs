#![allow(non_snake_case)]

use std::env;

use clap::Parser;
use eventsBot::cli::{self, Cli, Commands};
use eventsBot::config::{AppConfig, Settings};
use eventsBot::{logging, runtime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    let settings = Settings::resolve(&config, |key| env::var(key).ok())?;

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => runtime::run_bot(settings).await,
        Commands::Preview { event_file } => cli::preview(&event_file).await,
        Commands::Users => cli::list_users(&settings.optin_file).await,
    }
}
