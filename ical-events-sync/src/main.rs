mod cli;
mod error;
mod fetch;

use std::{env, future::Future, io, process};

use chrono::{Duration, Utc};
use reqwest::Client;
use tokio::{signal, time};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Args;
use error::SyncError;
use ical_events::{digest, write_collection, Window};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = cli::parse(env::args().skip(1).collect());

    let Some(url) = args.url.clone() else {
        fail(SyncError::Config("CALENDAR_URL not found in environment variables".into()));
    };

    let client = Client::new();

    let Some(period) = args.watch else {
        if let Err(err) = update(&client, &url, &args).await {
            fail(err);
        }
        return;
    };

    info!(seconds = period.as_secs(), "refreshing calendar periodically");
    let (client, url, args) = (&client, url.as_str(), &args);
    watch(period, signal::ctrl_c(), move || async move {
        if let Err(err) = update(client, url, args).await {
            error!(error = %err, "calendar update failed");
        }
    })
    .await;
}

/// Runs `refresh` every `period` until `shutdown` resolves. A shutdown requested while a refresh
/// is in flight ends the loop once that refresh is done.
async fn watch<S, F, R>(period: time::Duration, shutdown: S, mut refresh: F)
where
    S: Future,
    F: FnMut() -> R,
    R: Future<Output = ()>,
{
    let mut interval = time::interval(period);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("stopping");
                break;
            }
            _ = interval.tick() => refresh().await,
        }
    }
}

fn fail(err: SyncError) -> ! {
    eprintln!("Error: {err}");
    process::exit(1);
}

fn past_span(past: Duration) -> String {
    if past == Duration::days(Window::PAST_DAYS) {
        "the past week".to_owned()
    } else {
        format!("the past {} days", past.num_days())
    }
}

async fn update(client: &Client, url: &str, args: &Args) -> Result<(), SyncError> {
    let now = Utc::now();
    let window = Window::new(now, args.past, args.future).ok_or_else(|| {
        SyncError::Config("event window reaches beyond the supported date range".into())
    })?;

    let feed = fetch::fetch_feed(client, url).await?;
    let digest = digest(feed, &window)?;
    let path = write_collection(&digest.collection, &args.output_dir, now)?;

    println!(
        "Successfully downloaded {} events from {} and future to {}",
        digest.collection.events.len(),
        past_span(args.past),
        path.display()
    );

    Ok(())
}
