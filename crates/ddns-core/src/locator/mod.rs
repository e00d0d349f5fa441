//! Zone and record discovery
//!
//! [`RecordLocator`] turns configuration into provider handles: the zone
//! identifier for a domain, a single A record by exact name, or every A
//! record whose leading label equals a discovery pattern.

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, RecordFilter, RemoteRecord};
use tracing::debug;

/// Page size used when listing a zone for pattern discovery
pub const DISCOVERY_PAGE_SIZE: u32 = 100;

/// Opaque provider identifier of a zone
///
/// Looked up fresh every cycle; never cached across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneHandle {
    /// Provider zone ID
    pub id: String,
    /// Zone name the handle was resolved from
    pub name: String,
}

/// Whether `name` belongs to the discovery `pattern`
///
/// The first label must equal `pattern`, compared case-insensitively. This
/// is a literal prefix test on `pattern + "."`, so `local` matches
/// `local.foo.example.com` but neither `locally.example.com` nor
/// `sub.local.example.com`.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    let prefix_len = pattern.len() + 1;
    name.len() > prefix_len
        && name.is_char_boundary(pattern.len())
        && name[..pattern.len()].eq_ignore_ascii_case(pattern)
        && name.as_bytes()[pattern.len()] == b'.'
}

/// Locates zones and records through a [`DnsProvider`]
pub struct RecordLocator<'a> {
    provider: &'a dyn DnsProvider,
}

impl<'a> RecordLocator<'a> {
    /// Create a locator backed by `provider`
    pub fn new(provider: &'a dyn DnsProvider) -> Self {
        Self { provider }
    }

    /// Resolve the provider's identifier for `zone_name`
    ///
    /// # Returns
    ///
    /// - `Ok(ZoneHandle)`: The first matching zone
    /// - `Err(Error::ZoneNotFound)`: The provider returned no zone
    /// - `Err(Error::Provider)`: The lookup itself failed
    pub async fn resolve_zone_id(&self, zone_name: &str) -> Result<ZoneHandle> {
        let zones = self.provider.find_zone_by_name(zone_name).await?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::zone_not_found(zone_name))?;

        debug!(zone = zone_name, zone_id = %zone.id, "Resolved zone");
        Ok(ZoneHandle {
            id: zone.id,
            name: zone_name.to_string(),
        })
    }

    /// Find the A record named exactly `name`
    ///
    /// A missing record is `Ok(None)`, not an error.
    pub async fn find_record(&self, zone: &ZoneHandle, name: &str) -> Result<Option<RemoteRecord>> {
        let filter = RecordFilter::a_records().with_name(name);
        let records = self.provider.list_records(&zone.id, &filter).await?;
        Ok(records.into_iter().next())
    }

    /// Find every A record in the zone whose first label is `pattern`
    pub async fn find_by_pattern(&self, zone: &ZoneHandle, pattern: &str) -> Result<Vec<RemoteRecord>> {
        let filter = RecordFilter::a_records().with_per_page(DISCOVERY_PAGE_SIZE);
        let records = self.provider.list_records(&zone.id, &filter).await?;
        let listed = records.len();

        let matched: Vec<RemoteRecord> = records
            .into_iter()
            .filter(|record| matches_pattern(&record.name, pattern))
            .collect();

        debug!(
            zone = %zone.name,
            pattern,
            listed,
            matched = matched.len(),
            "Pattern discovery complete"
        );
        Ok(matched)
    }
}
