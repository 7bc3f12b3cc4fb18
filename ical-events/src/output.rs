use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{Error, EventCollection};

pub fn to_json(collection: &EventCollection) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(collection)?)
}

pub fn from_json<S: AsRef<str>>(s: S) -> Result<EventCollection, Error> {
    Ok(serde_json::from_str(s.as_ref())?)
}

/// One file per run date: `<dir>/calendar_events_YYYY-MM-DD.json`.
#[must_use]
pub fn output_path<P: AsRef<Path>>(dir: P, now: DateTime<Utc>) -> PathBuf {
    dir.as_ref()
        .join(format!("calendar_events_{}.json", now.format("%Y-%m-%d")))
}

/// Writes `collection` to its dated file below `dir`, replacing an earlier file of the same day.
pub fn write_collection<P: AsRef<Path>>(
    collection: &EventCollection,
    dir: P,
    now: DateTime<Utc>,
) -> Result<PathBuf, Error> {
    let dir = dir.as_ref();
    let json = to_json(collection)?;

    fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_owned(),
        source,
    })?;

    let path = output_path(dir, now);
    fs::write(&path, json).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), events = collection.events.len(), "wrote events");
    Ok(path)
}
