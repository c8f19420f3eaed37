//! Subscriber installation.
//!
//! Builds a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or a JSON formatting layer. With JSON enabled every event
//! carries `timestamp`, `level`, `target`, the structured fields recorded by
//! the bus (`subject`, `key`, `identity`, ...) and the message.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Handle returned by [`init_logging`].
///
/// The subscriber is global; the guard records what was installed.
#[derive(Debug)]
pub struct LoggingGuard {
    filter: String,
    json: bool,
}

impl LoggingGuard {
    /// Filter directive in effect.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Whether events are formatted as JSON.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        tracing::debug!("Logging guard released");
    }
}

/// Build the filter for a configuration.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter(e.to_string()))
}

/// Install the global subscriber.
///
/// # Errors
///
/// - `TelemetryError::Filter` - the log level is not a valid directive
/// - `TelemetryError::AlreadyInitialized` - a global subscriber exists
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = env_filter(config)?;

    let fmt_layer = if !config.console_output {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialized)?;

    tracing::debug!(
        filter = %config.log_level,
        json_logs = config.json_logs,
        console_output = config.console_output,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        filter: config.log_level.clone(),
        json: config.json_logs,
    })
}
