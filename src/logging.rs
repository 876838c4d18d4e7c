//! Logging setup.
//!
//! Logs go to **stderr** so stdout stays free for the host. Filtering follows
//! `RUST_LOG`, for example:
//!
//! ```bash
//! RUST_LOG=tharsis_provider=debug terraform plan
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn filter_or(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], with a custom default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter_or(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to install the global subscriber; returns `false` if one is already set.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(filter_or("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("tharsis_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,tharsis_provider::data_source=trace").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
