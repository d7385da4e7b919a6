//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "estate_market=debug,tower_http=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level; the configured level only
/// replaces the crate's own directive in the default filter.
pub fn init_logging(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

fn default_filter(log_level: Option<&str>) -> EnvFilter {
    match log_level {
        Some(level) if !level.is_empty() => {
            EnvFilter::new(format!("estate_market={level},tower_http={level}"))
        }
        _ => EnvFilter::new(DEFAULT_FILTER),
    }
}
