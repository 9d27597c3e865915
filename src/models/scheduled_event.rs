use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A guild scheduled event as seen by the bot.
///
/// Voice-hosted events carry `channel_name` and no `end_time`; externally
/// hosted events carry `location` and an explicit `end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: u64,
    pub guild_name: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
}

impl ScheduledEvent {
    /// The physical location if one is set, otherwise the hosting channel.
    pub fn venue(&self) -> Option<&str> {
        match self.location.as_deref() {
            Some(location) if !location.is_empty() => Some(location),
            _ => self.channel_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterestSignal {
    pub user_id: u64,
    pub event: ScheduledEvent,
}
