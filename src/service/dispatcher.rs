use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serenity::async_trait;
use tracing::{error, info, warn};

use crate::error::{DispatchError, PersistenceError, PlatformApiError};
use crate::models::scheduled_event::{InterestSignal, ScheduledEvent};
use crate::service::artifact_store::ArtifactStore;
use crate::service::ics::render_calendar;
use crate::service::message_templates::{
    render_delivery_message, ALREADY_OPTED_IN, NOT_OPTED_IN, OPTED_IN, OPTED_OUT,
};
use crate::service::opt_in_registry::{OptInOutcome, OptInRegistry, OptOutOutcome};
use crate::service::translator::{artifact_file_name, to_calendar_artifact, to_web_calendar_link};

/// Direct-message side of the chat platform.
#[async_trait]
pub trait CalendarMessenger: Send + Sync {
    async fn send_dm(&self, user_id: u64, content: &str) -> Result<(), PlatformApiError>;
    async fn send_file(&self, user_id: u64, content: &str, path: &Path) -> Result<(), PlatformApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Skipped,
    Delivered { path: PathBuf },
    Failed,
}

pub struct Dispatcher {
    registry: Arc<OptInRegistry>,
    artifacts: ArtifactStore,
    messenger: Arc<dyn CalendarMessenger>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<OptInRegistry>,
        artifacts: ArtifactStore,
        messenger: Arc<dyn CalendarMessenger>,
    ) -> Self {
        Self {
            registry,
            artifacts,
            messenger,
        }
    }

    pub fn registry(&self) -> &OptInRegistry {
        &self.registry
    }

    pub async fn is_opted_in(&self, user_id: u64) -> bool {
        self.registry.contains(user_id).await
    }

    pub async fn handle_opt_in(&self, user_id: u64) -> OptInOutcome {
        let outcome = self.registry.opt_in(user_id).await;
        let reply = match outcome {
            OptInOutcome::Added => {
                info!(user_id, "user opted in");
                OPTED_IN
            }
            OptInOutcome::AlreadyPresent => ALREADY_OPTED_IN,
        };
        self.notify_user(user_id, reply).await;
        outcome
    }

    pub async fn handle_opt_out(&self, user_id: u64) -> OptOutOutcome {
        let outcome = self.registry.opt_out(user_id).await;
        let reply = match outcome {
            OptOutOutcome::Removed => {
                info!(user_id, "user opted out");
                OPTED_OUT
            }
            OptOutOutcome::NotPresent => NOT_OPTED_IN,
        };
        self.notify_user(user_id, reply).await;
        outcome
    }

    /// Sends the calendar file for `signal.event` if the user opted in.
    /// Failures are logged and reported as `DeliveryOutcome::Failed`.
    pub async fn handle_interest(&self, signal: InterestSignal) -> DeliveryOutcome {
        info!(user_id = signal.user_id, event_id = signal.event.id, "detected an interested party");
        if !self.registry.contains(signal.user_id).await {
            return DeliveryOutcome::Skipped;
        }

        match self.deliver(&signal).await {
            Ok(path) => {
                info!(user_id = signal.user_id, path = %path.display(), "calendar file delivered");
                DeliveryOutcome::Delivered { path }
            }
            Err(err) => {
                error!(
                    user_id = signal.user_id,
                    event_id = signal.event.id,
                    error = %err,
                    "error sending calendar to user"
                );
                DeliveryOutcome::Failed
            }
        }
    }

    async fn deliver(&self, signal: &InterestSignal) -> Result<PathBuf, DispatchError> {
        let event = &signal.event;
        let artifact = to_calendar_artifact(event)?;
        let document = render_calendar(&artifact);
        let link = to_web_calendar_link(event)?;

        let file_name = artifact_file_name(event);
        let path = self
            .artifacts
            .write(&file_name, &document)
            .await
            .map_err(|source| DispatchError::Artifact {
                path: self.artifacts.dir().join(&file_name),
                source,
            })?;

        let body = render_delivery_message(&event.guild_name, &event.name, signal.user_id, &link);
        self.messenger.send_file(signal.user_id, &body, &path).await?;
        Ok(path)
    }

    pub fn log_new_event(&self, event: &ScheduledEvent) {
        info!(
            event_id = event.id,
            guild = %event.guild_name,
            name = %event.name,
            description = ?event.description,
            channel = ?event.channel_name,
            location = ?event.location,
            start = %event.start_time,
            end = ?event.end_time,
            "new scheduled event"
        );
    }

    /// Retries a pending registry save and drops expired calendar files.
    pub async fn maintain(&self, now: SystemTime) {
        if let Err(err) = self.registry.flush().await {
            warn!(error = %err, "periodic flush of opted-in users failed");
        }
        match self.artifacts.purge_expired(now).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "purged expired calendar files"),
            Err(err) => warn!(error = %err, "failed to purge calendar files"),
        }
    }

    pub async fn shutdown(&self) -> Result<(), PersistenceError> {
        info!(count = self.registry.len().await, "saving opted-in users before exit");
        self.registry.save().await
    }

    async fn notify_user(&self, user_id: u64, content: &str) {
        if let Err(err) = self.messenger.send_dm(user_id, content).await {
            warn!(user_id, error = %err, "failed to DM user");
        }
    }
}
