use icalendar::{Calendar, Component, EventLike};

use crate::models::calendar::CalendarArtifact;

/// Render a single-event calendar document.
pub fn render_calendar(artifact: &CalendarArtifact) -> String {
    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&artifact.uid());
    ics_event.summary(&artifact.summary);
    ics_event.starts(artifact.start);
    ics_event.ends(artifact.end);
    ics_event.location(&artifact.location);

    if let Some(ref desc) = artifact.description {
        ics_event.description(desc);
    }

    let ics_event = ics_event.done();
    cal.push(ics_event);
    let cal = cal.done();

    cal.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_utc_times_and_fields() {
        let artifact = CalendarArtifact {
            event_id: 7,
            summary: "Park run".to_string(),
            description: None,
            location: "Kings Park".to_string(),
            start: Utc.with_ymd_and_hms(2024, 2, 23, 11, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 2, 23, 12, 0, 0).unwrap(),
        };

        let ics = render_calendar(&artifact);
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20240223T110000Z"));
        assert!(ics.contains("DTEND:20240223T120000Z"));
        assert!(ics.contains("SUMMARY:Park run"));
        assert!(ics.contains("LOCATION:Kings Park"));
        assert!(ics.contains("UID:event-7@eventsbot"));
        assert!(!ics.contains("DESCRIPTION"));
    }
}
