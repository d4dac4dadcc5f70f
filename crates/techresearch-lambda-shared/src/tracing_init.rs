//! Tracing initialization for the Lambda function.

use tracing_subscriber::EnvFilter;

/// Initialize JSON-formatted tracing suitable for CloudWatch Logs.
///
/// The log level is controlled via the `RUST_LOG` environment variable and
/// defaults to `info`. Safe to call more than once; later calls keep the
/// first subscriber, which lets the smoke CLI and tests share this entry
/// point.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();
}
