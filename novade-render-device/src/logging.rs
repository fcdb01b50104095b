//! Tracing subscriber setup.
//!
//! The crate itself only emits `tracing` events. Hosts that do not install
//! their own subscriber can use one of these initializers.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Meant for tests and early startup; a second call is ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` still wins when set, so a single module can be turned up without
/// editing the config file.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter {
            filter: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.format.eq_ignore_ascii_case("json") {
        builder.json().with_ansi(false).try_init()
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).try_init()
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_logging_can_be_called_twice() {
        init_minimal_logging();
        init_minimal_logging();
    }

    #[test]
    fn configured_logging_reports_an_existing_subscriber() {
        init_minimal_logging();
        let err = init_logging(&LoggingConfig::default()).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInitialized(_)));
    }
}
