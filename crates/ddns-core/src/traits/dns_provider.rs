// # DNS Provider Trait
//
// Defines the narrow capability interface the reconciler needs from a DNS
// provider: zone lookup, record listing, record creation and record update.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordFilter, RecordInput};
//
// async fn example(provider: &dyn DnsProvider) -> ddns_core::Result<()> {
//     let zones = provider.find_zone_by_name("example.com").await?;
//     let zone_id = &zones[0].id;
//
//     let records = provider
//         .list_records(zone_id, &RecordFilter::a_records().with_name("home.example.com"))
//         .await?;
//
//     if records.is_empty() {
//         provider
//             .create_record(zone_id, &RecordInput::a("home.example.com", "203.0.113.7", 1))
//             .await?;
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The only record type the reconciler manages
pub const RECORD_TYPE_A: &str = "A";

/// A provider zone as returned by a name lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque provider identifier
    pub id: String,
    /// Zone name (e.g., "example.com")
    pub name: String,
}

/// A DNS record owned by the provider
///
/// The reconciler only ever holds read copies; every change is expressed
/// as an explicit create or update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// The record ID (provider-specific)
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (an IPv4 address for A records)
    pub content: String,
    /// Time-to-live
    pub ttl: u32,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
}

/// Filter for [`DnsProvider::list_records`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Exact record name
    pub name: Option<String>,
    /// Record type
    pub record_type: Option<String>,
    /// Page size
    pub per_page: Option<u32>,
}

impl RecordFilter {
    /// Filter matching A records only
    pub fn a_records() -> Self {
        Self {
            record_type: Some(RECORD_TYPE_A.to_string()),
            ..Self::default()
        }
    }

    /// Restrict to an exact record name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the page size
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// Body of a create or update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content
    pub content: String,
    /// Time-to-live
    pub ttl: u32,
}

impl RecordInput {
    /// An A record body
    pub fn a(name: impl Into<String>, content: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type: RECORD_TYPE_A.to_string(),
            name: name.into(),
            content: content.into(),
            ttl,
        }
    }
}

/// Trait for DNS provider implementations
///
/// Every call is single-shot and reports failure as an `Err` carrying the
/// upstream message; the caller decides whether that failure is fatal to a
/// cycle or scoped to one record.
///
/// # Rules
///
/// - ✅ Perform HTTP/HTTPS API calls to the provider's endpoints only
/// - ✅ Apply a fixed, short request timeout
/// - ❌ Retry, back off, or cache (owned by the caller)
/// - ❌ Decide whether an update is needed (owned by `DdnsEngine`)
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up zones by exact name
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Zone>)`: Matching zones, empty if none
    /// - `Err(Error)`: If the request failed
    async fn find_zone_by_name(&self, name: &str) -> Result<Vec<Zone>, crate::Error>;

    /// List records in a zone
    async fn list_records(
        &self,
        zone_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<RemoteRecord>, crate::Error>;

    /// Create a record
    async fn create_record(
        &self,
        zone_id: &str,
        record: &RecordInput,
    ) -> Result<RemoteRecord, crate::Error>;

    /// Replace an existing record's name, content and TTL
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordInput,
    ) -> Result<RemoteRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
