use chrono::{DateTime, Duration, TimeZone, Utc};
use ical_events::{digest, from_json, to_json, write_collection, Error, EventCollection, Window};
use pretty_assertions::assert_eq;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap()
}

fn window() -> Window {
    Window::around(now()).unwrap()
}

fn stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn calendar(events: &[String]) -> String {
    let mut feed =
        String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//ical-events//test//EN\r\n");
    for event in events {
        feed.push_str("BEGIN:VEVENT\r\n");
        feed.push_str(event);
        feed.push_str("END:VEVENT\r\n");
    }
    feed.push_str("END:VCALENDAR\r\n");
    feed
}

fn mixed_feed() -> String {
    let tomorrow = now() + Duration::days(1);
    let yesterday = now() - Duration::days(1);

    calendar(&[
        format!(
            "UID:standup\r\nSUMMARY:Standup\r\nDTSTART:{}\r\nDTEND:{}\r\nRRULE:FREQ=DAILY;COUNT=3\r\n",
            stamp(tomorrow),
            stamp(tomorrow + Duration::minutes(15)),
        ),
        format!(
            "UID:sync\r\nSUMMARY:Team Sync\r\nLOCATION:Room 2\r\nDTSTART:{}\r\nCREATED:20250101T080000Z\r\n",
            stamp(yesterday),
        ),
        format!(
            "UID:offsite\r\nSUMMARY:Offsite\r\nDTSTART;VALUE=DATE:{}\r\n",
            tomorrow.format("%Y%m%d")
        ),
        format!(
            "UID:ancient\r\nSUMMARY:Ancient\r\nDTSTART:{}\r\n",
            stamp(now() - Duration::days(30))
        ),
    ])
}

#[test]
fn non_recurring_event_from_yesterday() {
    let yesterday = now() - Duration::days(1);
    let feed = calendar(&[format!(
        "UID:sync\r\nSUMMARY:Team Sync\r\nLOCATION:Room 2\r\nDTSTART:{}\r\n",
        stamp(yesterday)
    )]);

    let digest = digest(feed, &window()).unwrap();
    let events = digest.collection.events;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Team Sync");
    assert_eq!(events[0].location, "Room 2");
    assert_eq!(events[0].description, "");
    assert_eq!(events[0].start, yesterday);
    assert_eq!(events[0].end, None);
    assert_eq!(
        events[0].text,
        "Event: Team Sync on Tuesday, March 11, 2025 at 12:00 PM. Location: Room 2"
    );
}

#[test]
fn count_rule_inside_window_yields_every_instance() {
    let start = now() + Duration::days(2);
    let feed = calendar(&[format!(
        "UID:weekly\r\nSUMMARY:Weekly\r\nDTSTART:{}\r\nRRULE:FREQ=WEEKLY;COUNT=5\r\n",
        stamp(start)
    )]);

    let events = digest(feed, &window()).unwrap().collection.events;
    assert_eq!(events.len(), 5);
    assert_eq!(events[4].start, start + Duration::weeks(4));
}

#[test]
fn weekly_rule_anchored_before_window() {
    let window = window();
    let feed = calendar(&[format!(
        "UID:weekly\r\nSUMMARY:Weekly\r\nDTSTART:{}\r\nRRULE:FREQ=WEEKLY;UNTIL={}\r\n",
        stamp(window.start - Duration::weeks(1)),
        stamp(now() + Duration::weeks(3)),
    )]);

    let events = digest(feed, &window).unwrap().collection.events;
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|event| event.start > window.start));
}

#[test]
fn malformed_rule_is_skipped() {
    let feed = calendar(&[
        format!(
            "UID:broken\r\nSUMMARY:Broken\r\nDTSTART:{}\r\nRRULE:FREQ=FORTNIGHTLY\r\n",
            stamp(now())
        ),
        format!("UID:fine\r\nSUMMARY:Fine\r\nDTSTART:{}\r\n", stamp(now())),
    ]);

    let digest = digest(feed, &window()).unwrap();

    assert_eq!(digest.collection.events.len(), 1);
    assert_eq!(digest.collection.events[0].summary, "Fine");
    assert_eq!(digest.skipped.len(), 1);
    assert!(matches!(
        &digest.skipped[0],
        Error::Recurrence { event, .. } if event == "broken"
    ));
}

#[test]
fn invalid_feed_fails() {
    let result = digest("this is not a calendar", &window());
    assert!(matches!(result, Err(Error::FeedParse(_))));
}

#[test]
fn output_is_sorted_and_zoned() {
    let window = window();
    let events = digest(mixed_feed(), &window).unwrap().collection.events;

    let summaries = events
        .iter()
        .map(|event| event.summary.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        summaries,
        ["Team Sync", "Offsite", "Standup", "Standup", "Standup"]
    );

    for pair in events.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }

    let json = serde_json::to_value(EventCollection { events }).unwrap();
    for event in json["events"].as_array().unwrap() {
        let start = event["start"].as_str().unwrap();
        let start = DateTime::parse_from_rfc3339(start).unwrap();
        assert!(window.contains(&start));

        if let Some(created) = event["created"].as_str() {
            DateTime::parse_from_rfc3339(created).unwrap();
        }
    }
}

#[test]
fn simultaneous_events_keep_feed_order() {
    let tomorrow = now() + Duration::days(1);
    let feed = calendar(&[
        format!("UID:review\r\nSUMMARY:Review\r\nDTSTART:{}\r\n", stamp(tomorrow)),
        format!(
            "UID:standup\r\nSUMMARY:Standup\r\nDTSTART:{}\r\nRRULE:FREQ=DAILY;COUNT=2\r\n",
            stamp(now())
        ),
    ]);

    let events = digest(feed, &window()).unwrap().collection.events;

    let summaries = events
        .iter()
        .map(|event| event.summary.as_str())
        .collect::<Vec<_>>();
    assert_eq!(summaries, ["Standup", "Review", "Standup"]);
    assert_eq!(events[1].start, tomorrow);
    assert_eq!(events[2].start, tomorrow);
}

#[test]
fn recurring_occurrences_keep_duration() {
    let events = digest(mixed_feed(), &window()).unwrap().collection.events;

    for standup in events.iter().filter(|event| event.summary == "Standup") {
        assert_eq!(standup.end, Some(standup.start + Duration::minutes(15)));
        assert!(standup.text.ends_with("until 12:15 PM"));
    }
}

#[test]
fn same_input_gives_identical_output() {
    let window = window();
    let first = to_json(&digest(mixed_feed(), &window).unwrap().collection).unwrap();
    let second = to_json(&digest(mixed_feed(), &window).unwrap().collection).unwrap();
    assert_eq!(first, second);
}

#[test]
fn written_document_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let collection = digest(mixed_feed(), &window()).unwrap().collection;

    let path = write_collection(&collection, dir.path().join("Calendars"), now()).unwrap();
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("calendar_events_2025-03-12.json")
    );

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(from_json(&written).unwrap(), collection);
    assert_eq!(to_json(&from_json(&written).unwrap()).unwrap(), written);

    let document: serde_json::Value = serde_json::from_str(&written).unwrap();
    let sync = document["events"]
        .as_array()
        .unwrap()
        .iter()
        .find(|event| event["summary"] == "Team Sync")
        .unwrap();
    assert!(sync["end"].is_null());
    assert_eq!(sync["description"], "");
    assert_eq!(sync["created"], "2025-01-01T08:00:00+00:00");
}
