use std::sync::Arc;

use anyhow::Context as _;
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use tracing::{error, info};

use crate::clients::discord::DiscordMessenger;
use crate::config::Settings;
use crate::handlers::discord::BotHandler;
use crate::service::artifact_store::ArtifactStore;
use crate::service::dispatcher::Dispatcher;
use crate::service::opt_in_registry::OptInRegistry;
use crate::tasks::maintenance_loop;
use crate::tasks::shutdown_signal::ShutdownSignal;
use crate::tasks::task_runner::TaskRunner;

pub async fn run_bot(settings: Settings) -> anyhow::Result<()> {
    let token = settings.require_token()?.to_string();

    // A malformed opt-in file is fatal.
    let registry = OptInRegistry::load(settings.optin_file.clone())
        .await
        .context("Unable to load opted-in users")?;
    let artifacts = ArtifactStore::new(settings.artifact_dir.clone(), settings.artifact_retention);
    let messenger = Arc::new(DiscordMessenger::new(Arc::new(Http::new(&token))));
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), artifacts, messenger));

    let mut task_runner = TaskRunner::new();
    task_runner.add_task({
        let dispatcher = dispatcher.clone();
        let every = settings.maintenance_interval;
        move || {
            tokio::spawn(async move {
                maintenance_loop::run_maintenance_loop(dispatcher, every).await;
            })
        }
    });
    let running = task_runner.start_all();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_SCHEDULED_EVENTS;
    let mut client = serenity::Client::builder(&token, intents)
        .event_handler(BotHandler::new(dispatcher.clone(), settings.event_timezone))
        .await
        .context("Error creating Serenity client")?;

    let mut shutdown = ShutdownSignal::install().context("Failed to install signal handlers")?;
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        let signal = shutdown.recv().await;
        info!(signal, "shutdown requested");
        shard_manager.shutdown_all().await;
    });

    let result = client.start().await;
    running.abort_all();
    if let Err(why) = &result {
        error!(error = ?why, "client error");
    }

    dispatcher
        .shutdown()
        .await
        .context("Failed to save opted-in users on shutdown")?;
    info!("save successful");
    result.context("Client error")
}
