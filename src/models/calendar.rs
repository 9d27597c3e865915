use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarArtifact {
    pub event_id: u64,
    pub summary: String,
    pub description: Option<String>,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarArtifact {
    pub fn uid(&self) -> String {
        format!("event-{}@eventsbot", self.event_id)
    }
}
