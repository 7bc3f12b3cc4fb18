use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone,
};
use chrono_tz::{Tz, UTC};
use serde::{Deserialize, Serialize, Serializer};

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false))
}

fn serialize_optional_timestamp<S: Serializer>(
    timestamp: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(timestamp) => serialize_timestamp(timestamp, serializer),
        None => serializer.serialize_none(),
    }
}

/// Resolves a wall-clock time in `tz`. Times skipped by a DST transition move forward by an
/// hour, repeated times resolve to their first occurrence.
pub(crate) fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// A date value as it appears in a calendar feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// All-day value without a time of day.
    Date(NaiveDate),
    /// Local time without any zone information.
    Floating(NaiveDateTime),
    Zoned(DateTime<Tz>),
}

impl EventTime {
    /// Attaches UTC to values that carry no zone; dates become midnight UTC.
    #[must_use]
    pub fn normalize(&self) -> DateTime<Tz> {
        match *self {
            EventTime::Date(date) => UTC.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            EventTime::Floating(naive) => UTC.from_utc_datetime(&naive),
            EventTime::Zoned(zoned) => zoned,
        }
    }
}

/// One `VEVENT` of a feed, before any recurrence is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    /// `DURATION`, only consulted when there is no `end`.
    pub duration: Option<Duration>,
    pub created: Option<EventTime>,
    /// Raw `RRULE` value, e.g. `FREQ=WEEKLY;COUNT=4`.
    pub rrule: Option<String>,
}

impl RawEvent {
    /// Name used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        self.uid
            .as_deref()
            .or(self.summary.as_deref())
            .unwrap_or("(unnamed event)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub summary: String,
    pub description: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_optional_timestamp")]
    pub end: Option<DateTime<FixedOffset>>,
    pub location: String,
    #[serde(serialize_with = "serialize_optional_timestamp")]
    pub created: Option<DateTime<FixedOffset>>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCollection {
    pub events: Vec<NormalizedEvent>,
}
