use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{0}")]
    Config(String),

    #[error("failed to download calendar: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to download calendar: server responded with {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Digest(#[from] ical_events::Error),
}
