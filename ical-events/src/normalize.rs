use chrono::{DateTime, FixedOffset};

use crate::{recurrence::Occurrence, NormalizedEvent, RawEvent};

pub const UNTITLED: &str = "No Title";

#[must_use]
pub fn normalize(event: &RawEvent, occurrence: &Occurrence) -> NormalizedEvent {
    let summary = event.summary.as_deref().unwrap_or(UNTITLED).to_owned();
    let description = event.description.clone().unwrap_or_default();
    let location = event.location.clone().unwrap_or_default();

    let text = describe(
        &summary,
        &occurrence.start,
        occurrence.end.as_ref(),
        &location,
        &description,
    );

    NormalizedEvent {
        summary,
        description,
        start: occurrence.start,
        end: occurrence.end,
        location,
        created: event
            .created
            .map(|created| created.normalize().fixed_offset()),
        text,
    }
}

/// Renders the sentence used for search indexing, e.g.
/// `Event: Standup on Monday, March 17, 2025 at 09:00 AM until 09:15 AM. Location: Room 2`.
#[must_use]
pub fn describe(
    summary: &str,
    start: &DateTime<FixedOffset>,
    end: Option<&DateTime<FixedOffset>>,
    location: &str,
    description: &str,
) -> String {
    let mut text = format!(
        "Event: {summary} on {}",
        start.format("%A, %B %d, %Y at %I:%M %p")
    );

    if let Some(end) = end {
        text.push_str(&format!(" until {}", end.format("%I:%M %p")));
    }

    if !location.is_empty() {
        text.push_str(&format!(". Location: {location}"));
    }

    if !description.is_empty() {
        text.push_str(&format!(". Details: {description}"));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventTime;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn describe_start_only() {
        assert_eq!(
            describe("Team Sync", &at("2025-03-11T09:30:00+00:00"), None, "Room 2", ""),
            "Event: Team Sync on Tuesday, March 11, 2025 at 09:30 AM. Location: Room 2"
        );
    }

    #[test]
    fn describe_all_segments() {
        assert_eq!(
            describe(
                "Retro",
                &at("2025-03-14T15:00:00+01:00"),
                Some(&at("2025-03-14T16:30:00+01:00")),
                "Berlin office",
                "Bring notes",
            ),
            "Event: Retro on Friday, March 14, 2025 at 03:00 PM until 04:30 PM. \
             Location: Berlin office. Details: Bring notes"
        );
    }

    #[test]
    fn describe_uses_wall_clock_of_timestamp() {
        assert_eq!(
            describe("Late", &at("2025-03-14T23:45:00-05:00"), None, "", ""),
            "Event: Late on Friday, March 14, 2025 at 11:45 PM"
        );
    }

    #[test]
    fn normalize_applies_defaults() {
        let event = RawEvent {
            uid: None,
            summary: None,
            description: None,
            location: None,
            start: EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            end: None,
            duration: None,
            created: Some(EventTime::Floating(
                NaiveDate::from_ymd_opt(2025, 1, 2)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
            )),
            rrule: None,
        };
        let occurrence = Occurrence {
            start: at("2025-03-14T00:00:00+00:00"),
            end: None,
        };

        let normalized = normalize(&event, &occurrence);
        assert_eq!(normalized.summary, UNTITLED);
        assert_eq!(normalized.description, "");
        assert_eq!(normalized.location, "");
        assert_eq!(normalized.end, None);
        assert_eq!(
            normalized.created.map(|created| created.to_rfc3339()).as_deref(),
            Some("2025-01-02T08:00:00+00:00")
        );
        assert_eq!(
            normalized.text,
            "Event: No Title on Friday, March 14, 2025 at 12:00 AM"
        );
    }
}
