use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike, Utc};

use crate::error::TranslationError;
use crate::models::calendar::CalendarArtifact;
use crate::models::scheduled_event::ScheduledEvent;

const ILLEGAL_FILE_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];
const GOOGLE_CALENDAR_URL: &str = "https://www.google.com/calendar/render";
const LINK_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

pub fn sanitize_file_name(input: &str) -> String {
    input
        .chars()
        .map(|c| if ILLEGAL_FILE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

pub fn artifact_file_name(event: &ScheduledEvent) -> String {
    sanitize_file_name(&format!("{}_{}.ics", event.name, event.guild_name))
}

/// Shifts a wall-clock time to UTC by subtracting the whole hours of `offset`.
///
/// Seconds are dropped and any sub-hour part of the offset is ignored. This is
/// not a time zone conversion: it knows nothing about DST, so events whose end
/// falls on the other side of a transition from their start come out an hour off.
pub fn normalize_to_utc(local: NaiveDateTime, offset: &FixedOffset) -> DateTime<Utc> {
    let offset_hours = i64::from(offset.local_minus_utc() / 3600);
    let truncated = local.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(local);
    (truncated - Duration::hours(offset_hours)).and_utc()
}

pub fn to_calendar_artifact(event: &ScheduledEvent) -> Result<CalendarArtifact, TranslationError> {
    let location = event
        .venue()
        .map(sanitize_file_name)
        .ok_or(TranslationError::MissingLocation { event_id: event.id })?;

    let start_offset = event.start_time.offset();
    let start = normalize_to_utc(event.start_time.naive_local(), start_offset);
    // The end is shifted by the start's offset, not its own.
    let end = match event.end_time {
        Some(end_time) => normalize_to_utc(end_time.naive_local(), start_offset),
        None => start + Duration::hours(1),
    };

    Ok(CalendarArtifact {
        event_id: event.id,
        summary: sanitize_file_name(&event.name),
        description: event.description.clone(),
        location,
        start,
        end,
    })
}

pub fn to_web_calendar_link(event: &ScheduledEvent) -> Result<String, TranslationError> {
    let location = event
        .venue()
        .ok_or(TranslationError::MissingLocation { event_id: event.id })?;

    let start = event.start_time.with_timezone(&Utc);
    let end = event
        .end_time
        .map(|end| end.with_timezone(&Utc))
        .unwrap_or_else(|| start + Duration::hours(1));

    // details is always empty
    Ok(format!(
        "{base}?action=TEMPLATE&text={text}&location={location}&details=&dates={start}/{end}",
        base = GOOGLE_CALENDAR_URL,
        text = urlencoding::encode(&event.name),
        location = urlencoding::encode(location),
        start = start.format(LINK_TIME_FORMAT),
        end = end.format(LINK_TIME_FORMAT),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    fn voice_event() -> ScheduledEvent {
        ScheduledEvent {
            id: 42,
            guild_name: "Board Gamers".to_string(),
            name: "Game night".to_string(),
            description: Some("Bring snacks".to_string()),
            start_time: offset(8).with_ymd_and_hms(2024, 2, 23, 19, 0, 0).unwrap(),
            end_time: None,
            location: None,
            channel_name: Some("General".to_string()),
        }
    }

    #[test]
    fn sanitize_replaces_each_illegal_char() {
        assert_eq!(sanitize_file_name("a/b:c*d?e\"f<g>h|i\\j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_file_name("Café night (v2).ics"), "Café night (v2).ics");
    }

    #[test]
    fn voice_event_defaults_to_one_hour() {
        let artifact = to_calendar_artifact(&voice_event()).unwrap();
        assert_eq!(artifact.start, Utc.with_ymd_and_hms(2024, 2, 23, 11, 0, 0).unwrap());
        assert_eq!(artifact.end, Utc.with_ymd_and_hms(2024, 2, 23, 12, 0, 0).unwrap());
        assert_eq!(artifact.location, "General");
    }

    #[test]
    fn normalization_rolls_over_the_date() {
        let local = offset(10)
            .with_ymd_and_hms(2024, 3, 1, 5, 30, 45)
            .unwrap()
            .naive_local();
        let normalized = normalize_to_utc(local, &offset(10));
        assert_eq!(normalized, Utc.with_ymd_and_hms(2024, 2, 29, 19, 30, 0).unwrap());
    }

    #[test]
    fn sub_hour_offsets_are_truncated() {
        let india = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let local = india.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap().naive_local();
        assert_eq!(
            normalize_to_utc(local, &india),
            Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_location_falls_back_to_channel() {
        let mut event = voice_event();
        event.location = Some(String::new());
        let artifact = to_calendar_artifact(&event).unwrap();
        assert_eq!(artifact.location, "General");
    }

    #[test]
    fn missing_venue_is_an_error() {
        let mut event = voice_event();
        event.channel_name = None;
        assert_eq!(
            to_calendar_artifact(&event),
            Err(TranslationError::MissingLocation { event_id: 42 })
        );
    }
}
