//! Configuration types for the DDNS reconciler
//!
//! The configuration is built once at startup and is immutable for the
//! lifetime of the process. Loading it (environment, CLI) is the caller's job.

use serde::{Deserialize, Serialize};

/// Lowest TTL accepted by the provider; `1` means "automatic"
pub const MIN_TTL: u32 = 1;

/// Highest TTL accepted
pub const MAX_TTL: u32 = 86_400;

/// Shortest allowed poll interval (in seconds)
pub const MIN_POLL_INTERVAL_SECS: u64 = 60;

/// Main DDNS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Zone / domain name (e.g., "example.com")
    pub zone: String,

    /// Which records are kept in sync
    pub targets: RecordTargets,

    /// Record TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Interval between reconciliation cycles (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Destination pattern for the rename transaction
    #[serde(default)]
    pub new_pattern: Option<String>,
}

/// Record selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecordTargets {
    /// A fixed list of fully-qualified record names
    Explicit {
        /// Record names (e.g., "home.example.com")
        names: Vec<String>,
    },

    /// Every A record in the zone whose first label equals `pattern`
    Pattern {
        /// Leading label (e.g., "local")
        pattern: String,
    },
}

impl DdnsConfig {
    /// Configuration managing an explicit list of record names
    pub fn explicit<I, S>(zone: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_targets(
            zone,
            RecordTargets::Explicit {
                names: names.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Configuration discovering records by their leading label
    pub fn pattern(zone: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::with_targets(
            zone,
            RecordTargets::Pattern {
                pattern: pattern.into(),
            },
        )
    }

    fn with_targets(zone: impl Into<String>, targets: RecordTargets) -> Self {
        Self {
            zone: zone.into(),
            targets,
            ttl: default_ttl(),
            poll_interval_secs: default_poll_interval_secs(),
            new_pattern: None,
        }
    }

    /// Set the record TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Set the rename destination pattern
    pub fn with_new_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.new_pattern = Some(pattern.into());
        self
    }

    /// The discovery pattern, if auto-discovery is enabled
    pub fn discovery_pattern(&self) -> Option<&str> {
        match &self.targets {
            RecordTargets::Pattern { pattern } => Some(pattern),
            RecordTargets::Explicit { .. } => None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone.trim().is_empty() {
            return Err(crate::Error::config("Domain cannot be empty"));
        }

        match &self.targets {
            RecordTargets::Explicit { names } => {
                if names.is_empty() {
                    return Err(crate::Error::config(
                        "Record names must be a non-empty list when auto-discovery is disabled",
                    ));
                }
                if let Some(bad) = names.iter().find(|name| name.trim().is_empty()) {
                    return Err(crate::Error::config(format!(
                        "Invalid record name: '{}'",
                        bad
                    )));
                }
            }
            RecordTargets::Pattern { pattern } => validate_label("DNS pattern", pattern)?,
        }

        if !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            return Err(crate::Error::config(format!(
                "TTL must be between {} and {} seconds. Got: {}",
                MIN_TTL, MAX_TTL, self.ttl
            )));
        }

        if self.poll_interval_secs < MIN_POLL_INTERVAL_SECS {
            return Err(crate::Error::config(format!(
                "Check interval must be at least {} seconds. Got: {}",
                MIN_POLL_INTERVAL_SECS, self.poll_interval_secs
            )));
        }

        if let Some(ref new_pattern) = self.new_pattern {
            validate_label("New subdomain pattern", new_pattern)?;
        }

        Ok(())
    }
}

/// A pattern is a single DNS label: non-empty, no dots
fn validate_label(what: &str, label: &str) -> Result<(), crate::Error> {
    if label.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if label.contains('.') {
        return Err(crate::Error::config(format!(
            "{} must be a single label without dots. Got: '{}'",
            what, label
        )));
    }
    Ok(())
}

fn default_ttl() -> u32 {
    MIN_TTL
}

fn default_poll_interval_secs() -> u64 {
    300
}
