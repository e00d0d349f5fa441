//! Public IP resolution with ordered failover
//!
//! [`IpResolver`] walks its sources in order and returns the first candidate
//! that validates as a dotted-quad IPv4 address. A source that errors, times
//! out, or reports garbage is logged and skipped. Nothing is cached: every
//! call re-resolves.

use crate::error::{Error, Result};
use crate::traits::IpSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

/// A validated dotted-quad IPv4 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResolvedIp(Ipv4Addr);

impl ResolvedIp {
    /// Parse and validate a candidate address
    ///
    /// Exactly four dot-separated groups of one to three decimal digits,
    /// each in `0..=255`. Surrounding whitespace or any other character is
    /// rejected.
    pub fn parse(candidate: &str) -> Result<Self> {
        let invalid = || Error::invalid_input(format!("Invalid IPv4 address: '{}'", candidate));

        let mut octets = [0u8; 4];
        let mut parts = candidate.split('.');

        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *octet = part.parse::<u8>().map_err(|_| invalid())?;
        }

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(Ipv4Addr::from(octets)))
    }

    /// The address as a standard library type
    pub fn addr(&self) -> Ipv4Addr {
        self.0
    }

    /// Whether a record's content already points at this address
    pub fn matches_content(&self, content: &str) -> bool {
        ResolvedIp::parse(content).is_ok_and(|other| other == *self)
    }
}

impl fmt::Display for ResolvedIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Ipv4Addr> for ResolvedIp {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr)
    }
}

impl TryFrom<String> for ResolvedIp {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResolvedIp> for String {
    fn from(ip: ResolvedIp) -> Self {
        ip.to_string()
    }
}

/// Ordered, failover IP resolver
pub struct IpResolver {
    sources: Vec<Box<dyn IpSource>>,
}

impl IpResolver {
    /// Create a resolver over `sources`, tried in the given order
    pub fn new(sources: Vec<Box<dyn IpSource>>) -> Self {
        Self { sources }
    }

    /// Number of configured sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Determine the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedIp)`: The first candidate that validates
    /// - `Err(Error::NoIpSourceAvailable)`: Every source failed or returned
    ///   an invalid address
    pub async fn current_ip(&self) -> Result<ResolvedIp> {
        for source in &self.sources {
            let candidate = match source.fetch_candidate().await {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!(source = source.describe(), "Failed to get IP: {}", e);
                    continue;
                }
            };

            match ResolvedIp::parse(&candidate) {
                Ok(ip) => {
                    debug!(source = source.describe(), %ip, "Resolved current IP");
                    return Ok(ip);
                }
                Err(e) => {
                    warn!(source = source.describe(), "Discarding response: {}", e);
                }
            }
        }

        Err(Error::NoIpSourceAvailable {
            attempted: self.sources.len(),
        })
    }
}
