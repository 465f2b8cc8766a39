use tracing_subscriber::EnvFilter;

use crate::{AppError, AppResult};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global log subscriber.
///
/// Records go to stderr so stdout stays free for data. `log` records are
/// forwarded through the subscriber's log bridge.
pub fn init_logging() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| AppError::Unrecoverable(format!("failed to initialise logging: {}", e)))
}
