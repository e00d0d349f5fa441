//! Error types for the DDNS reconciler
//!
//! Cycle-level preconditions ([`Error::NoIpSourceAvailable`],
//! [`Error::ZoneNotFound`]) abort a whole reconciliation cycle. Everything a
//! provider call returns is scoped to the record that triggered it and is
//! folded into that record's outcome by the engine.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS reconciler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Every IP lookup source failed or returned an invalid address
    #[error("Failed to get current IP from all {attempted} source(s)")]
    NoIpSourceAvailable {
        /// Number of sources that were tried
        attempted: usize,
    },

    /// The provider has no zone for the configured domain
    #[error("Zone not found for domain: {0}")]
    ZoneNotFound(String),

    /// Non-success response or transport failure from a provider call
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Upstream message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (malformed addresses, record names of the wrong shape)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport-level failure talking to an IP lookup source
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound(zone.into())
    }

    /// Whether this error aborts an entire reconciliation cycle
    ///
    /// Only the preconditions shared by every target record are fatal.
    /// Provider failures belong to a single record.
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoIpSourceAvailable { .. } | Self::ZoneNotFound(_) | Self::Config(_)
        )
    }
}
