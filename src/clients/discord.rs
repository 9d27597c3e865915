use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, TimeZone};
use chrono_tz::Tz;
use serenity::all::{Context, CreateAttachment, CreateMessage, GuildId, UserId};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::guild::ScheduledEvent as DiscordScheduledEvent;
use serenity::model::Timestamp;

use crate::error::PlatformApiError;
use crate::models::scheduled_event::ScheduledEvent;
use crate::service::dispatcher::CalendarMessenger;

pub struct DiscordMessenger {
    http: Arc<Http>,
}

impl DiscordMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    async fn dm_channel(&self, user_id: u64) -> Result<serenity::model::channel::PrivateChannel, PlatformApiError> {
        UserId::new(user_id)
            .create_dm_channel(self.http.as_ref())
            .await
            .map_err(|e| PlatformApiError::from_serenity("create DM channel", e))
    }
}

#[async_trait]
impl CalendarMessenger for DiscordMessenger {
    async fn send_dm(&self, user_id: u64, content: &str) -> Result<(), PlatformApiError> {
        let channel = self.dm_channel(user_id).await?;
        channel
            .say(self.http.as_ref(), content)
            .await
            .map_err(|e| PlatformApiError::from_serenity("send DM", e))?;
        Ok(())
    }

    async fn send_file(&self, user_id: u64, content: &str, path: &Path) -> Result<(), PlatformApiError> {
        let channel = self.dm_channel(user_id).await?;
        let attachment = CreateAttachment::path(path)
            .await
            .map_err(|e| PlatformApiError::from_serenity("read attachment", e))?;
        channel
            .send_message(self.http.as_ref(), CreateMessage::new().content(content).add_file(attachment))
            .await
            .map_err(|e| PlatformApiError::from_serenity("send calendar file", e))?;
        Ok(())
    }
}

/// Expresses a platform timestamp as wall-clock time in `tz`.
pub fn localize(timestamp: &Timestamp, tz: &Tz) -> Result<DateTime<FixedOffset>, PlatformApiError> {
    let secs = timestamp.unix_timestamp();
    localize_unix(secs, tz).ok_or_else(|| {
        PlatformApiError::new("read event timestamp", format!("{secs} is outside the supported range"))
    })
}

/// `None` when `secs` cannot be represented as a calendar date.
pub fn localize_unix(secs: i64, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let utc = DateTime::from_timestamp(secs, 0)?;
    let local = tz.from_utc_datetime(&utc.naive_utc());
    Some(local.with_timezone(&local.offset().fix()))
}

/// Builds the domain event from a platform event, looking up the guild and
/// channel names it only references by id.
pub async fn resolve_scheduled_event(
    ctx: &Context,
    event: &DiscordScheduledEvent,
    tz: &Tz,
) -> Result<ScheduledEvent, PlatformApiError> {
    let guild_name = guild_name(ctx, event.guild_id).await?;
    let channel_name = match event.channel_id {
        Some(channel_id) => {
            let channel = channel_id
                .to_channel(ctx)
                .await
                .map_err(|e| PlatformApiError::from_serenity("fetch channel", e))?;
            channel.guild().map(|c| c.name)
        }
        None => None,
    };
    let location = event.metadata.as_ref().and_then(|m| m.location.clone());

    Ok(ScheduledEvent {
        id: event.id.get(),
        guild_name,
        name: event.name.clone(),
        description: event.description.clone(),
        start_time: localize(&event.start_time, tz)?,
        end_time: event.end_time.as_ref().map(|end| localize(end, tz)).transpose()?,
        location,
        channel_name,
    })
}

async fn guild_name(ctx: &Context, guild_id: GuildId) -> Result<String, PlatformApiError> {
    if let Some(name) = guild_id.name(&ctx.cache) {
        return Ok(name);
    }
    let guild = guild_id
        .to_partial_guild(&ctx.http)
        .await
        .map_err(|e| PlatformApiError::from_serenity("fetch guild", e))?;
    Ok(guild.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localize_applies_zone_offset() {
        // 2024-02-23T11:00:00Z
        let local = localize_unix(1_708_686_000, &chrono_tz::Australia::Perth).unwrap();
        assert_eq!(local.to_rfc3339(), "2024-02-23T19:00:00+08:00");
    }

    #[test]
    fn localize_tracks_dst() {
        // 2024-07-01T12:00:00Z, New York is on EDT
        let local = localize_unix(1_719_835_200, &chrono_tz::America::New_York).unwrap();
        assert_eq!(local.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        assert!(localize_unix(i64::MAX, &Tz::UTC).is_none());
        assert!(localize_unix(i64::MIN, &chrono_tz::Australia::Perth).is_none());
    }
}
