//! Tracing subscriber setup

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "warn";

/// Filter directive for a `-v` count, `None` leaves the configured filter
pub fn verbosity_filter(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        _ => Some("debug"),
    }
}

/// `RUST_LOG` wins over `-v`, which wins over `configured`
fn env_filter(configured: &str, verbosity: u8) -> EnvFilter {
    let fallback = verbosity_filter(verbosity).unwrap_or(configured);
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
}

/// Subscriber for the time before configuration is loaded.
///
/// Honors `RUST_LOG` and `-v` only; meant for [`tracing::subscriber::with_default`].
pub fn bootstrap(verbosity: u8) -> impl Subscriber + Send + Sync + 'static {
    subscriber(env_filter(DEFAULT_FILTER, verbosity))
}

/// Install the global subscriber, writing to stderr
pub fn init(config: &LoggingConfig, verbosity: u8) {
    subscriber(env_filter(&config.filter, verbosity)).init();
}
