use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::{Tz, UTC};
use ical::{property::Property, IcalParser};
use tracing::{debug, warn};

use crate::{structs::localize, Error, EventTime, RawEvent};

pub fn parse_feed<S: AsRef<str>>(s: S) -> Result<Vec<RawEvent>, Error> {
    let mut calendars = 0;
    let mut events = Vec::new();

    for calendar in IcalParser::new(s.as_ref().as_bytes()) {
        let calendar = calendar.map_err(|err| Error::FeedParse(err.to_string()))?;
        calendars += 1;

        for event in &calendar.events {
            events.push(parse_event(&event.properties)?);
        }
    }

    if calendars == 0 {
        return Err(Error::FeedParse("no VCALENDAR found".into()));
    }

    debug!(calendars, events = events.len(), "parsed calendar feed");
    Ok(events)
}

fn parse_event(properties: &[Property]) -> Result<RawEvent, Error> {
    let find = |name: &str| {
        properties
            .iter()
            .find(|property| property.name.eq_ignore_ascii_case(name))
    };
    let value = |name: &str| find(name).and_then(|property| property.value.as_deref());
    let text = |name: &str| value(name).map(unescape_text);

    let uid = value("UID").map(str::to_owned);

    let start = find("DTSTART").ok_or_else(|| {
        Error::FeedParse(format!(
            "event {} has no DTSTART",
            uid.as_deref().unwrap_or("without UID")
        ))
    })?;

    let duration = value("DURATION")
        .map(|raw| {
            parse_duration(raw)
                .ok_or_else(|| Error::FeedParse(format!("invalid DURATION value `{raw}`")))
        })
        .transpose()?;

    Ok(RawEvent {
        summary: text("SUMMARY"),
        description: text("DESCRIPTION"),
        location: text("LOCATION"),
        start: parse_time(start)?,
        end: find("DTEND").map(parse_time).transpose()?,
        duration,
        created: find("CREATED").map(parse_time).transpose()?,
        rrule: value("RRULE")
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(str::to_owned),
        uid,
    })
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|value| value.trim_matches('"'))
}

fn parse_time(property: &Property) -> Result<EventTime, Error> {
    let value = property.value.as_deref().unwrap_or_default().trim();
    let invalid = |err: chrono::ParseError| {
        Error::FeedParse(format!(
            "invalid {} value `{value}`: {err}",
            property.name
        ))
    };

    let is_date = param(property, "VALUE").is_some_and(|kind| kind.eq_ignore_ascii_case("DATE"))
        || value.len() == 8;

    if is_date {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .map(EventTime::Date)
            .map_err(invalid);
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").map_err(invalid)?;
        return Ok(EventTime::Zoned(UTC.from_utc_datetime(&naive)));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").map_err(invalid)?;

    let Some(tzid) = param(property, "TZID") else {
        return Ok(EventTime::Floating(naive));
    };

    match tzid.trim_start_matches('/').parse::<Tz>() {
        Ok(tz) => Ok(EventTime::Zoned(localize(tz, naive))),
        Err(_) => {
            warn!(tzid, "unknown time zone, treating {} as floating", property.name);
            Ok(EventTime::Floating(naive))
        }
    }
}

/// Parses an RFC 5545 duration such as `PT1H30M`, `P2W` or `-P1D`.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut total = Duration::zero();
    let mut digits = String::new();
    let mut in_time = false;
    let mut has_component = false;

    for c in rest.strip_prefix('P')?.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        if c == 'T' && !in_time && digits.is_empty() {
            in_time = true;
            continue;
        }

        let n = digits.parse::<i64>().ok()?;
        digits.clear();

        let part = match (c, in_time) {
            ('W', false) => Duration::try_weeks(n)?,
            ('D', false) => Duration::try_days(n)?,
            ('H', true) => Duration::try_hours(n)?,
            ('M', true) => Duration::try_minutes(n)?,
            ('S', true) => Duration::try_seconds(n)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
        has_component = true;
    }

    if !has_component || !digits.is_empty() {
        return None;
    }

    if negative {
        Duration::zero().checked_sub(&total)
    } else {
        Some(total)
    }
}

fn unescape_text(s: &str) -> String {
    let mut unescaped = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => unescaped.push('\n'),
            Some(escaped) => unescaped.push(escaped),
            None => unescaped.push('\\'),
        }
    }

    unescaped
}
