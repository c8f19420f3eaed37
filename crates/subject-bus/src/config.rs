//! Bus configuration and validation
//!
//! The configuration is fixed when the bus is constructed; in particular the
//! storage strategy cannot change afterwards.
//!
//! # Example
//!
//! ```
//! use subject_bus::{BusConfigBuilder, StorageStrategy};
//!
//! let config = BusConfigBuilder::new()
//!     .storage_strategy(StorageStrategy::LinearScan)
//!     .auto_derive_identity(true)
//!     .build()
//!     .expect("valid config");
//! assert!(config.auto_derive_identity);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default key used when a subject is supplied without an explicit key.
pub const DEFAULT_IMPLICIT_KEY: &str = "subject_bus.implicit_key";

/// How the registry resolves a subject to its namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageStrategy {
    /// Side table keyed by the subject's identity. O(1) lookup.
    #[default]
    IdentityTag,
    /// Parallel subject/namespace sequences scanned by identity. O(n) lookup.
    LinearScan,
}

impl StorageStrategy {
    /// Stable name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityTag => "identity-tag",
            Self::LinearScan => "linear-scan",
        }
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity-tag" | "identity_tag" | "tag" | "map" => Ok(Self::IdentityTag),
            "linear-scan" | "linear_scan" | "scan" | "array" => Ok(Self::LinearScan),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Bus configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Swallow identity/subject failures instead of returning them.
    pub production_mode: bool,
    /// Infer a subscriber identity from the callback's declared name.
    pub auto_derive_identity: bool,
    /// Registry storage strategy.
    pub storage_strategy: StorageStrategy,
    /// Key used when a subject is given without one.
    pub implicit_key: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            production_mode: false,
            auto_derive_identity: false,
            storage_strategy: StorageStrategy::IdentityTag,
            implicit_key: DEFAULT_IMPLICIT_KEY.to_string(),
        }
    }
}

impl BusConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.implicit_key.is_empty() {
            return Err(ConfigError::EmptyImplicitKey);
        }
        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SUBJECT_BUS_PRODUCTION`: production mode (default: false)
    /// - `SUBJECT_BUS_AUTO_IDENTITY`: derive identities from callbacks (default: false)
    /// - `SUBJECT_BUS_STORAGE`: `identity-tag` or `linear-scan` (default: identity-tag)
    /// - `SUBJECT_BUS_IMPLICIT_KEY`: implicit key token
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage_strategy = match env::var("SUBJECT_BUS_STORAGE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.storage_strategy,
        };

        let config = Self {
            production_mode: env_flag("SUBJECT_BUS_PRODUCTION").unwrap_or(defaults.production_mode),
            auto_derive_identity: env_flag("SUBJECT_BUS_AUTO_IDENTITY")
                .unwrap_or(defaults.auto_derive_identity),
            storage_strategy,
            implicit_key: env::var("SUBJECT_BUS_IMPLICIT_KEY").unwrap_or(defaults.implicit_key),
        };

        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to toggle production mode
    #[must_use]
    pub fn with_production_mode(mut self, enabled: bool) -> Self {
        self.production_mode = enabled;
        self
    }

    /// Builder-style method to set the storage strategy
    #[must_use]
    pub fn with_storage_strategy(mut self, strategy: StorageStrategy) -> Self {
        self.storage_strategy = strategy;
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Builder for BusConfig with validation
#[derive(Default)]
pub struct BusConfigBuilder {
    production_mode: Option<bool>,
    auto_derive_identity: Option<bool>,
    storage_strategy: Option<StorageStrategy>,
    implicit_key: Option<String>,
}

impl BusConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swallow diagnostic failures
    #[must_use]
    pub fn production_mode(mut self, enabled: bool) -> Self {
        self.production_mode = Some(enabled);
        self
    }

    /// Derive identities from callback names
    #[must_use]
    pub fn auto_derive_identity(mut self, enabled: bool) -> Self {
        self.auto_derive_identity = Some(enabled);
        self
    }

    /// Set the registry storage strategy
    #[must_use]
    pub fn storage_strategy(mut self, strategy: StorageStrategy) -> Self {
        self.storage_strategy = Some(strategy);
        self
    }

    /// Set the implicit key token
    #[must_use]
    pub fn implicit_key(mut self, key: impl Into<String>) -> Self {
        self.implicit_key = Some(key.into());
        self
    }

    /// Build the BusConfig, validating all parameters
    pub fn build(self) -> Result<BusConfig, ConfigError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    #[must_use]
    pub fn build_unchecked(self) -> BusConfig {
        let defaults = BusConfig::default();

        BusConfig {
            production_mode: self.production_mode.unwrap_or(defaults.production_mode),
            auto_derive_identity: self
                .auto_derive_identity
                .unwrap_or(defaults.auto_derive_identity),
            storage_strategy: self.storage_strategy.unwrap_or(defaults.storage_strategy),
            implicit_key: self.implicit_key.unwrap_or(defaults.implicit_key),
        }
    }
}
