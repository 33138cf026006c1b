//! Structured logging with tracing
//!
//! `BANKER_LOG` takes precedence over the configured level and accepts full
//! `EnvFilter` directives (e.g. `banker_session=debug`).

use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::{Result, SessionError};

/// Environment variable overriding the configured filter
pub const LOG_ENV_VAR: &str = "BANKER_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| level_filter(level));

    let registry = Registry::default().with(filter);
    let installed = if config.json_format {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|e| SessionError::config(format!("logging already initialized: {}", e)))?;

    info!(%level, "Logging initialized");
    Ok(())
}

/// Filter admitting everything at `level` and above.
///
/// Built from the parsed level, not the configured string, so aliases such
/// as `warning` are not mistaken for target directives.
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(SessionError::config(format!(
            "invalid log level: {}. Use trace, debug, info, warn, or error",
            level
        ))),
    }
}
