//! Structured logging setup for the binary.

use crate::error::{ContactError, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(level: &str) -> String {
    format!("contact_sieve={}", level.to_lowercase())
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`. With `json` each event is one
/// JSON object per line, otherwise a human readable line with uptime.
pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.map_err(|e| {
        ContactError::configuration(format!("failed to install logging subscriber: {}", e))
    })?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_targets_crate() {
        assert_eq!(default_directive("info"), "contact_sieve=info");
        assert_eq!(default_directive("DEBUG"), "contact_sieve=debug");
    }

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init("warn", false);
        assert!(matches!(
            init("warn", true),
            Err(ContactError::Configuration { .. })
        ));
    }
}
