use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{AppError, Result};

/// Install the global subscriber. `RUST_LOG` overrides the default level.
///
/// Fails rather than panics if the host already installed one.
pub fn init_tracing(verbose: bool) -> Result<()> {
    subscriber(env_filter(verbose))
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_info_filter_hides_debug() {
        tracing::subscriber::with_default(subscriber(EnvFilter::new("info")), || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));
        });
    }

    #[test]
    fn test_debug_filter_shows_debug() {
        tracing::subscriber::with_default(subscriber(EnvFilter::new("debug")), || {
            assert!(tracing::enabled!(Level::DEBUG));
            assert!(!tracing::enabled!(Level::TRACE));
        });
    }
}
