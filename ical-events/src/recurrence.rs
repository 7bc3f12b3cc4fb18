use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rrule::{RRule, Tz as RuleTz, Unvalidated};
use tracing::{trace, warn};

use crate::{structs::localize, Error, RawEvent};

/// Upper bound on instants generated for a single rule.
const MAX_OCCURRENCES: u16 = u16::MAX;

/// The range of instants an occurrence must fall in to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub const PAST_DAYS: i64 = 7;
    pub const FUTURE_DAYS: i64 = 365;

    /// Returns `None` when either bound falls outside the representable date range.
    #[must_use]
    pub fn new(now: DateTime<Utc>, past: Duration, future: Duration) -> Option<Self> {
        Some(Self {
            start: now.checked_sub_signed(past)?,
            end: now.checked_add_signed(future)?,
        })
    }

    /// One week back, one year ahead.
    #[must_use]
    pub fn around(now: DateTime<Utc>) -> Option<Self> {
        Self::new(
            now,
            Duration::days(Self::PAST_DAYS),
            Duration::days(Self::FUTURE_DAYS),
        )
    }

    #[must_use]
    pub fn contains<T: TimeZone>(&self, instant: &DateTime<T>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
}

/// Resolves an event into the occurrences that fall inside `window`.
///
/// Events without a rule yield at most one occurrence. Rules are evaluated from the event's
/// start in its own zone, so wall-clock times stay put across DST changes, and every occurrence
/// inherits the duration of the template event.
pub fn expand(event: &RawEvent, window: &Window) -> Result<Vec<Occurrence>, Error> {
    let start = event.start.normalize();
    let end = template_end(event, &start);

    let Some(rule) = event.rrule.as_deref() else {
        if !window.contains(&start) {
            trace!(event = event.label(), "event outside of window");
            return Ok(Vec::new());
        }

        return Ok(vec![Occurrence {
            start: start.fixed_offset(),
            end: end.map(|end| end.fixed_offset()),
        }]);
    };

    let fail = |reason: String| Error::Recurrence {
        event: event.label().to_owned(),
        reason,
    };

    let rule = normalize_until(rule, start.timezone()).map_err(fail)?;
    let rrule_set = rule
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| fail(err.to_string()))?
        .build(start.with_timezone(&RuleTz::Tz(start.timezone())))
        .map_err(|err| fail(err.to_string()))?;

    let result = rrule_set
        .after(window.start.with_timezone(&RuleTz::UTC))
        .before(window.end.with_timezone(&RuleTz::UTC))
        .all(MAX_OCCURRENCES);

    if result.limited {
        warn!(
            event = event.label(),
            limit = MAX_OCCURRENCES,
            "recurrence truncated at occurrence limit"
        );
    }

    let duration = end.map(|end| end - start);

    let occurrences = result
        .dates
        .into_iter()
        .filter(|instant| *instant > window.start && *instant < window.end)
        .filter(|instant| *instant >= window.start)
        .map(|instant| {
            let start = instant.fixed_offset();
            Occurrence {
                start,
                end: duration.and_then(|duration| start.checked_add_signed(duration)),
            }
        })
        .collect::<Vec<_>>();

    trace!(
        event = event.label(),
        occurrences = occurrences.len(),
        "expanded recurrence"
    );

    Ok(occurrences)
}

fn template_end(event: &RawEvent, start: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let end = match (&event.end, event.duration) {
        (Some(end), _) => end.normalize(),
        (None, Some(duration)) => start.checked_add_signed(duration)?,
        (None, None) => return None,
    };

    if end < *start {
        warn!(event = event.label(), "event ends before it starts, ignoring its end");
        return None;
    }

    Some(end)
}

/// Rewrites a date-only or floating `UNTIL` to UTC, reading it in the anchor's zone. A
/// date-only value covers that whole day.
fn normalize_until(rule: &str, tz: Tz) -> Result<String, String> {
    rule.split(';')
        .map(|part| {
            let Some((key, value)) = part.split_once('=') else {
                return Ok(part.to_owned());
            };

            if !key.trim().eq_ignore_ascii_case("UNTIL") || value.ends_with('Z') {
                return Ok(part.to_owned());
            }

            let naive = if value.len() == 8 {
                NaiveDate::parse_from_str(value, "%Y%m%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(23, 59, 59))
            } else {
                NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
            }
            .ok_or_else(|| format!("invalid UNTIL value `{value}`"))?;

            let until = localize(tz, naive).with_timezone(&Utc);
            Ok(format!("{key}={}", until.format("%Y%m%dT%H%M%SZ")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.join(";"))
}
