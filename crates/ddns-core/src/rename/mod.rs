//! Bulk rename of pattern-matched records
//!
//! A one-shot transaction that retargets every A record whose leading label
//! is `source` to the same name under `dest`, keeping content, TTL and zone.
//! Only names of the shape `<source>.<label>.<zone>` are renamed; anything
//! else is reported and left untouched.

use crate::engine::RenameReport;
use crate::error::{Error, Result};
use crate::locator::{RecordLocator, matches_pattern};
use crate::traits::{DnsProvider, RecordInput};
use tracing::{error, info, warn};

/// Derive the renamed form of `name`
///
/// `local.foo.example.com` with source `local`, dest `dev` and zone
/// `example.com` becomes `dev.foo.example.com`. Exactly one label must sit
/// between the pattern label and the zone; everything after the pattern
/// label is preserved verbatim.
pub fn renamed_name(name: &str, source: &str, dest: &str, zone: &str) -> Result<String> {
    if !matches_pattern(name, source) {
        return Err(Error::invalid_input(format!(
            "Record {} does not start with pattern '{}'",
            name, source
        )));
    }

    let rest = &name[source.len() + 1..];

    // Index of the dot separating the subdomain from the zone
    let middle = rest
        .len()
        .checked_sub(zone.len() + 1)
        .filter(|&dot| rest.as_bytes()[dot] == b'.')
        .filter(|&dot| rest[dot + 1..].eq_ignore_ascii_case(zone))
        .map(|dot| &rest[..dot]);

    match middle {
        Some(label) if !label.is_empty() && !label.contains('.') => Ok(format!("{}.{}", dest, rest)),
        _ => Err(Error::invalid_input(format!(
            "Record {} does not have the shape {}.<subdomain>.{}",
            name, source, zone
        ))),
    }
}

/// One-shot rename over every record matching a source pattern
pub struct RenameTransaction<'a> {
    provider: &'a dyn DnsProvider,
    zone: &'a str,
}

impl<'a> RenameTransaction<'a> {
    /// Create a transaction against `zone`
    pub fn new(provider: &'a dyn DnsProvider, zone: &'a str) -> Self {
        Self { provider, zone }
    }

    /// Rename every record under `source` to the equivalent name under `dest`
    ///
    /// # Returns
    ///
    /// - `Ok(RenameReport)`: Discovery succeeded; per-record failures are in
    ///   `errors`
    /// - `Err(Error)`: Zone resolution or discovery failed
    pub async fn rename_matching(&self, source: &str, dest: &str) -> Result<RenameReport> {
        if source.eq_ignore_ascii_case(dest) {
            return Err(Error::config(format!(
                "New subdomain pattern '{}' is the same as the current pattern",
                dest
            )));
        }

        let locator = RecordLocator::new(self.provider);
        let zone = locator.resolve_zone_id(self.zone).await?;
        let records = locator.find_by_pattern(&zone, source).await?;

        info!(
            count = records.len(),
            "Renaming records from pattern '{}' to '{}'",
            source, dest
        );

        let mut report = RenameReport::default();

        for record in records {
            debug_assert!(
                matches_pattern(&record.name, source),
                "discovery returned {} outside pattern {}",
                record.name,
                source
            );

            let new_name = match renamed_name(&record.name, source, dest, self.zone) {
                Ok(new_name) => new_name,
                Err(e) => {
                    warn!(record = %record.name, "Skipping rename: {}", e);
                    report.errors.push(e.to_string());
                    continue;
                }
            };

            let body = RecordInput {
                record_type: record.record_type.clone(),
                name: new_name.clone(),
                content: record.content.clone(),
                ttl: record.ttl,
            };

            match self.provider.update_record(&zone.id, &record.id, &body).await {
                Ok(renamed) => {
                    info!("Renamed {} to {}", record.name, renamed.name);
                    report.renamed.push(renamed);
                }
                Err(e) => {
                    error!(record = %record.name, "Rename failed: {}", e);
                    report.errors.push(format!(
                        "Failed to rename {} to {}: {}",
                        record.name, new_name, e
                    ));
                }
            }
        }

        Ok(report)
    }
}
