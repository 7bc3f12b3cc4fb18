use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("calendar feed is not valid iCalendar data: {0}")]
    FeedParse(String),

    #[error("cannot expand recurrence rule of {event}: {reason}")]
    Recurrence { event: String, reason: String },

    #[error("failed to serialize events: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
