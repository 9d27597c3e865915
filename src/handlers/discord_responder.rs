// Minimal Discord "interaction" types for application commands
use serenity::async_trait;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::all::CommandInteraction;
use serenity::prelude::Context;
use tracing::warn;

use crate::error::PlatformApiError;

#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn reply(&self, content: &str) -> Result<(), PlatformApiError>;
}

pub struct SerenityResponder<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
}

impl<'a> SerenityResponder<'a> {
    pub fn for_command(ctx: &'a Context, command: &'a CommandInteraction) -> Self {
        Self { ctx, command }
    }
}

#[async_trait]
impl InteractionResponder for SerenityResponder<'_> {
    async fn reply(&self, content: &str) -> Result<(), PlatformApiError> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new().content(content),
        );
        self.command
            .create_response(&self.ctx.http, response)
            .await
            .map_err(|e| {
                let err = PlatformApiError::from_serenity("respond to command", e);
                warn!(command = %self.command.data.name, error = %err, "interaction response rejected");
                err
            })
    }
}
