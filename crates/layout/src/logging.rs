// Chunk: docs/chunks/layout_config - Tracing subscriber setup
//!
//! Logging setup using the tracing ecosystem.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{LayoutError, Result};

/// Environment variable consulted for the log filter.
pub const LOG_ENV_VAR: &str = "CANOPY_LOG";

/// Resolves the filter string: `CANOPY_LOG` wins over the configured default.
pub fn resolve_filter(default_filter: &str) -> String {
    std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| default_filter.to_string())
}

/// Installs a global stderr subscriber.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(resolve_filter(default_filter))
        .map_err(|e| LayoutError::Logging(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LayoutError::Logging(format!("Failed to init logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging("warn");
        let err = init_logging("warn").unwrap_err();
        assert!(matches!(err, LayoutError::Logging(_)));
    }
}
