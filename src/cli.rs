use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::models::scheduled_event::ScheduledEvent;
use crate::service::ics::render_calendar;
use crate::service::translator::{artifact_file_name, to_calendar_artifact, to_web_calendar_link};
use crate::store::load_user_ids;

#[derive(Parser)]
#[command(name = "eventsBot", about = "Mirrors guild scheduled events into calendar invites")]
pub struct Cli {
    /// Env-style file with KEY=VALUE settings
    #[arg(long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to Discord and serve events (default)
    Run,
    /// Print the calendar file and web link for an event stored as JSON
    Preview { event_file: PathBuf },
    /// List the opted-in user ids
    Users,
}

pub struct Preview {
    pub file_name: String,
    pub document: String,
    pub link: String,
}

pub fn preview_event(event: &ScheduledEvent) -> anyhow::Result<Preview> {
    let artifact = to_calendar_artifact(event)?;
    Ok(Preview {
        file_name: artifact_file_name(event),
        document: render_calendar(&artifact),
        link: to_web_calendar_link(event)?,
    })
}

pub async fn preview(event_file: &Path) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(event_file)
        .await
        .with_context(|| format!("Failed to read {}", event_file.display()))?;
    let event: ScheduledEvent = serde_json::from_str(&content).context("Invalid event JSON")?;
    let preview = preview_event(&event)?;
    println!("# {}\n{}\n{}", preview.file_name, preview.document, preview.link);
    Ok(())
}

pub async fn list_users(optin_file: &Path) -> anyhow::Result<()> {
    let mut users: Vec<u64> = load_user_ids(optin_file).await?.into_iter().collect();
    users.sort_unstable();
    println!("{} opted-in users", users.len());
    for user in users {
        println!("{}", user);
    }
    Ok(())
}
