//! Log output for the build log.
//!
//! Everything dsrun prints goes through `tracing`. The host captures stdout
//! into the build log, so the format is compact: no timestamps, no targets,
//! and colours only when the host asked for them.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level when `RUST_LOG` is not set
    pub level: Level,
    /// Emit ANSI colour codes
    pub use_color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_color: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_color(use_color: bool) -> Self {
        Self {
            use_color,
            ..Default::default()
        }
    }
}

/// Initialize the tracing subscriber. Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

        let layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(config.use_color)
            .with_target(false)
            .without_time()
            .compact();

        // A subscriber may already be installed by an embedding test harness.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}
