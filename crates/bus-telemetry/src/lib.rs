//! # Bus Telemetry
//!
//! Logging bootstrap for processes embedding `subject-bus`. The library
//! itself only emits `tracing` events; this crate installs the subscriber
//! that renders them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bus_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SUBJECT_BUS_LOG_LEVEL` | `info` | Filter directive, falls back to `RUST_LOG` |
//! | `SUBJECT_BUS_CONSOLE_OUTPUT` | `true` | Write events to stdout |
//! | `SUBJECT_BUS_JSON_LOGS` | `false` | JSON formatted events |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log level is not a valid `EnvFilter` directive.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was installed earlier in this process.
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}
