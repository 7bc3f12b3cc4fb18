use std::env;
use std::path::PathBuf;
use std::process;

use chrono::{Duration, Utc};
use getopts::Options;
use ical_events::Window;

const URL_VAR: &str = "CALENDAR_URL";
const OUTPUT_DIR_VAR: &str = "CALENDAR_OUTPUT_DIR";

pub struct Args {
    pub url: Option<String>,
    pub output_dir: PathBuf,
    pub past: Duration,
    pub future: Duration,
    pub watch: Option<tokio::time::Duration>,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "u",
        "url",
        "URL of the iCalendar feed [Default: $CALENDAR_URL]",
        "URL",
    );
    opts.optopt(
        "o",
        "output-dir",
        "Directory the dated event files are written to [Default: $CALENDAR_OUTPUT_DIR or Calendars]",
        "DIR",
    );
    opts.optopt(
        "",
        "past-days",
        "Keep occurrences up to this many days in the past [Default: 7]",
        "DAYS",
    );
    opts.optopt(
        "",
        "future-days",
        "Keep occurrences up to this many days in the future [Default: 365]",
        "DAYS",
    );
    opts.optopt(
        "w",
        "watch",
        "Keep running and refresh the calendar every SECONDS",
        "SECONDS",
    );
    opts
}

/// Days the window may reach from now in either direction.
fn span(days: i64) -> Result<Duration, &'static str> {
    if days < 0 {
        return Err("must not be negative");
    }

    Duration::try_days(days)
        .filter(|span| Window::new(Utc::now(), *span, *span).is_some())
        .ok_or("reaches beyond the supported date range")
}

fn days(matches: &getopts::Matches, name: &str, default: i64) -> Duration {
    let days = match matches.opt_get_default(name, default) {
        Ok(days) => days,
        Err(err) => {
            eprintln!("Provided value for option '{name}' is invalid: {err}");
            process::exit(1);
        }
    };

    match span(days) {
        Ok(span) => span,
        Err(reason) => {
            eprintln!("Provided value for option '{name}' {reason}: {days}");
            process::exit(1);
        }
    }
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    let url = matches
        .opt_str("url")
        .or_else(|| env::var(URL_VAR).ok())
        .filter(|url| !url.trim().is_empty());

    let output_dir = matches
        .opt_str("output-dir")
        .or_else(|| env::var(OUTPUT_DIR_VAR).ok())
        .map_or_else(|| PathBuf::from("Calendars"), PathBuf::from);

    let past = days(&matches, "past-days", Window::PAST_DAYS);
    let future = days(&matches, "future-days", Window::FUTURE_DAYS);

    let watch = match matches.opt_get::<u64>("watch") {
        Ok(None) => None,
        Ok(Some(0)) => {
            eprintln!("Provided value for option 'watch' must be at least 1 second");
            process::exit(1);
        }
        Ok(Some(secs)) => Some(tokio::time::Duration::from_secs(secs)),
        Err(err) => {
            eprintln!("Provided value for option 'watch' is invalid: {err}");
            process::exit(1);
        }
    };

    Args {
        url,
        output_dir,
        past,
        future,
        watch,
    }
}
