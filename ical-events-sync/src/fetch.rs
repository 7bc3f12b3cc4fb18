use reqwest::Client;
use tracing::debug;

use crate::error::SyncError;

/// Downloads the feed body. Anything but a 2xx response is an error; there are no retries.
pub async fn fetch_feed(client: &Client, url: &str) -> Result<String, SyncError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::Status(status));
    }

    let body = response.text().await?;
    debug!(bytes = body.len(), "downloaded calendar feed");

    Ok(body)
}
