use tracing::{info, warn};

use crate::{expand, normalize, parse_feed, Error, EventCollection, Window};

/// Result of one pass over a feed.
#[derive(Debug)]
pub struct Digest {
    pub collection: EventCollection,
    /// Events whose recurrence rule could not be expanded. They are left out of `collection`.
    pub skipped: Vec<Error>,
}

/// Parses `feed` and flattens every event into the occurrences that fall inside `window`,
/// sorted by start time.
///
/// A broken recurrence rule only drops the event it belongs to; anything wrong with the feed
/// itself fails the whole digest.
pub fn digest<S: AsRef<str>>(feed: S, window: &Window) -> Result<Digest, Error> {
    let raw_events = parse_feed(feed)?;

    let mut events = Vec::new();
    let mut skipped = Vec::new();

    for raw_event in &raw_events {
        match expand(raw_event, window) {
            Ok(occurrences) => events.extend(
                occurrences
                    .iter()
                    .map(|occurrence| normalize(raw_event, occurrence)),
            ),
            Err(err) => {
                warn!(event = raw_event.label(), error = %err, "skipping event");
                skipped.push(err);
            }
        }
    }

    events.sort_by_key(|event| event.start);

    info!(
        components = raw_events.len(),
        events = events.len(),
        skipped = skipped.len(),
        "digested calendar feed"
    );

    Ok(Digest {
        collection: EventCollection { events },
        skipped,
    })
}
