use std::sync::Arc;

use chrono_tz::Tz;
use serenity::all::{Command, GuildScheduledEventUserAddEvent, Interaction as DiscordInteraction, ScheduledEvent as DiscordScheduledEvent};
use serenity::async_trait;
use serenity::builder::CreateCommand;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

use crate::clients::discord::resolve_scheduled_event;
use crate::error::PlatformApiError;
use crate::handlers::discord_responder::{InteractionResponder, SerenityResponder};
use crate::models::scheduled_event::InterestSignal;
use crate::service::dispatcher::Dispatcher;
use crate::service::message_templates::command_ack;
use crate::service::opt_in_registry::{OptInOutcome, OptOutOutcome};

pub const OPTIN_COMMAND: &str = "optin";
pub const STOP_COMMAND: &str = "stop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    OptIn,
    Stop,
}

impl SlashCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            OPTIN_COMMAND => Some(Self::OptIn),
            STOP_COMMAND => Some(Self::Stop),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OptIn => OPTIN_COMMAND,
            Self::Stop => STOP_COMMAND,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    OptIn(OptInOutcome),
    OptOut(OptOutOutcome),
}

pub fn global_commands() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(OPTIN_COMMAND).description("Choosing to opt in to Events Manager messages"),
        CreateCommand::new(STOP_COMMAND)
            .description("Stop EventsManager sending you messages when interested in Events"),
    ]
}

pub struct BotHandler {
    dispatcher: Arc<Dispatcher>,
    timezone: Tz,
}

impl BotHandler {
    pub fn new(dispatcher: Arc<Dispatcher>, timezone: Tz) -> Self {
        BotHandler {
            dispatcher,
            timezone,
        }
    }

    /// Acknowledges the command, then applies it. Nothing changes if the
    /// acknowledgement is rejected.
    pub async fn handle_command_with<R: InteractionResponder + ?Sized>(
        &self,
        responder: &R,
        command_name: &str,
        user_id: u64,
    ) -> Option<CommandOutcome> {
        let Some(command) = SlashCommand::parse(command_name) else {
            debug!(command_name, "ignoring unknown command");
            return None;
        };
        info!(command = command.name(), user_id, "detected slash command");

        if let Err(err) = responder.reply(&command_ack(command.name())).await {
            error!(command = command.name(), error = %err, "exception in handle slash command");
            return None;
        }

        let outcome = match command {
            SlashCommand::OptIn => CommandOutcome::OptIn(self.dispatcher.handle_opt_in(user_id).await),
            SlashCommand::Stop => CommandOutcome::OptOut(self.dispatcher.handle_opt_out(user_id).await),
        };
        Some(outcome)
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "connected to gateway");

        for builder in global_commands() {
            if let Err(e) = Command::create_global_command(&ctx.http, builder).await {
                let err = PlatformApiError::from_serenity("register global command", e);
                error!(error = %err, "command registration rejected");
            }
        }
    }

    async fn guild_scheduled_event_create(&self, ctx: Context, event: DiscordScheduledEvent) {
        match resolve_scheduled_event(&ctx, &event, &self.timezone).await {
            Ok(event) => self.dispatcher.log_new_event(&event),
            Err(err) => warn!(event_id = event.id.get(), error = %err, "failed to resolve new event"),
        }
    }

    async fn guild_scheduled_event_user_add(&self, ctx: Context, subscribed: GuildScheduledEventUserAddEvent) {
        let user_id = subscribed.user_id.get();
        // Skip the API lookups for users who never opted in.
        if !self.dispatcher.is_opted_in(user_id).await {
            debug!(user_id, "interested user has not opted in");
            return;
        }

        let raw = match subscribed
            .guild_id
            .scheduled_event(&ctx.http, subscribed.scheduled_event_id, false)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                let err = PlatformApiError::from_serenity("fetch scheduled event", e);
                error!(user_id, error = %err, "cannot load event for interested user");
                return;
            }
        };
        let event = match resolve_scheduled_event(&ctx, &raw, &self.timezone).await {
            Ok(event) => event,
            Err(err) => {
                error!(user_id, error = %err, "cannot resolve event for interested user");
                return;
            }
        };

        self.dispatcher
            .handle_interest(InterestSignal { user_id, event })
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: DiscordInteraction) {
        if let DiscordInteraction::Command(command) = interaction {
            let responder = SerenityResponder::for_command(&ctx, &command);
            self.handle_command_with(&responder, &command.data.name, command.user.id.get())
                .await;
        }
    }
}
