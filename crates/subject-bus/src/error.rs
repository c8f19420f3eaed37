//! # Bus Errors
//!
//! Error types raised by the event bus and its configuration.

use thiserror::Error;

/// Errors from bus configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The implicit key token must not be empty, otherwise it would be
    /// indistinguishable from an omitted key.
    #[error("Implicit key token cannot be empty")]
    EmptyImplicitKey,

    /// Unknown storage strategy name.
    #[error("Unknown storage strategy: {0} (expected identity-tag or linear-scan)")]
    UnknownStrategy(String),
}

/// Errors from bus operations.
///
/// `IdentityRequired` and `InvalidSubject` are diagnostic failures: in
/// production mode they are logged and the operation becomes a no-op.
/// `Callback` always propagates.
#[derive(Debug, Error)]
pub enum BusError {
    /// A subscriber identity was needed but none could be resolved.
    #[error("Could not determine the subscriber identity for {operation}: {hint}")]
    IdentityRequired {
        /// The operation that needed the identity (`listen_once`, `unlisten`).
        operation: &'static str,
        /// What the caller can do about it.
        hint: String,
    },

    /// The subject/key combination does not resolve to a registry entry.
    #[error("Subject {subject} with key {key:?} does not resolve to a registry entry")]
    InvalidSubject {
        /// Debug rendering of the subject.
        subject: String,
        /// The key involved, if any.
        key: Option<String>,
    },

    /// A subscriber callback failed during dispatch or replay.
    #[error("Subscriber callback failed: {0}")]
    Callback(#[source] anyhow::Error),

    /// Invalid bus configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl BusError {
    /// Short stable label (snake_case) for logs.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::IdentityRequired { .. } => "identity_required",
            Self::InvalidSubject { .. } => "invalid_subject",
            Self::Callback(_) => "callback_failed",
            Self::Config(_) => "invalid_config",
        }
    }

    /// Whether production mode turns this error into a silent no-op.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Self::IdentityRequired { .. } | Self::InvalidSubject { .. }
        )
    }
}
