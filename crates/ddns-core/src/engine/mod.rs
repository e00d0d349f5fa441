//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the current public IP via IpResolver
//! - Resolving the zone handle and the set of target records
//! - Issuing the minimal create/update call per record
//! - Aggregating per-record outcomes into a CycleReport
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ IpResolver  │─── ResolvedIp ──────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ DdnsEngine   │
//!                            └──────────────┘
//!                                     │
//!                  ┌──────────────────┼──────────────────┐
//!                  │                  │                  │
//!                  ▼                  ▼                  ▼
//!          ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!          │RecordLocator │   │ DnsProvider  │   │ CycleReport  │
//!          │ (lookup)     │   │(create/update│   │  (outcomes)  │
//!          └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve current IP (fatal on failure)
//! 2. Resolve zone handle (fatal on failure)
//! 3. Resolve targets: explicit names, or pattern discovery (fatal on failure)
//! 4. Per target: look up, then skip, update, or create
//! 5. Per-target failures are recorded in that target's outcome only

mod report;

pub use report::{CycleReport, OutcomeAction, RenameReport, UpdateOutcome};

use crate::config::{DdnsConfig, RecordTargets};
use crate::error::{Error, Result};
use crate::locator::{RecordLocator, ZoneHandle};
use crate::rename::RenameTransaction;
use crate::resolver::{IpResolver, ResolvedIp};
use crate::traits::{DnsProvider, RecordInput};
use tracing::{debug, error, info, warn};

/// Core DDNS engine
///
/// The engine holds no state between cycles beyond the immutable
/// configuration. Every cycle re-resolves the IP and the zone handle.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Call [`DdnsEngine::run_cycle()`] once per tick (see `Scheduler`)
/// 3. Or call [`DdnsEngine::rename_matching()`] once for a bulk rename
pub struct DdnsEngine {
    /// Failover IP resolver
    resolver: IpResolver,

    /// DNS provider for lookups and writes
    provider: Box<dyn DnsProvider>,

    /// Immutable configuration
    config: DdnsConfig,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: Ordered IP sources
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration (validated here)
    pub fn new(
        resolver: IpResolver,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver,
            provider,
            config,
        })
    }

    /// The engine's configuration
    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Run one full reconciliation cycle over the configured targets
    ///
    /// # Returns
    ///
    /// - `Ok(CycleReport)`: Every target was processed (some may have failed)
    /// - `Err(Error)`: A cycle-level precondition failed; no target was touched
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let current_ip = self.resolver.current_ip().await?;
        info!(%current_ip, "Current IP");

        let locator = RecordLocator::new(self.provider.as_ref());
        let zone = locator.resolve_zone_id(&self.config.zone).await?;

        let targets = match &self.config.targets {
            RecordTargets::Explicit { names } => names.clone(),
            RecordTargets::Pattern { pattern } => {
                let discovered = locator.find_by_pattern(&zone, pattern).await?;
                if discovered.is_empty() {
                    warn!(pattern = %pattern, zone = %zone.name, "No records match the discovery pattern");
                }
                discovered.into_iter().map(|record| record.name).collect()
            }
        };

        Ok(self.reconcile_targets(&locator, &zone, current_ip, &targets).await)
    }

    /// Reconcile an explicit set of record names against the current IP
    ///
    /// The IP and zone handle are each resolved exactly once, independent of
    /// the number of targets.
    pub async fn reconcile(&self, targets: &[String]) -> Result<CycleReport> {
        let current_ip = self.resolver.current_ip().await?;
        info!(%current_ip, "Current IP");

        let locator = RecordLocator::new(self.provider.as_ref());
        let zone = locator.resolve_zone_id(&self.config.zone).await?;

        Ok(self.reconcile_targets(&locator, &zone, current_ip, targets).await)
    }

    /// Rename every record under the discovery pattern to `new_pattern`
    ///
    /// Both patterns come from the configuration.
    pub async fn rename_matching(&self) -> Result<RenameReport> {
        let source = self.config.discovery_pattern().ok_or_else(|| {
            Error::config("Rename requires auto-discovery with a DNS pattern")
        })?;
        let dest = self
            .config
            .new_pattern
            .as_deref()
            .ok_or_else(|| Error::config("Rename requires a new subdomain pattern"))?;

        RenameTransaction::new(self.provider.as_ref(), &self.config.zone)
            .rename_matching(source, dest)
            .await
    }

    async fn reconcile_targets(
        &self,
        locator: &RecordLocator<'_>,
        zone: &ZoneHandle,
        current_ip: ResolvedIp,
        targets: &[String],
    ) -> CycleReport {
        let mut outcomes = Vec::with_capacity(targets.len());

        for name in targets {
            let outcome = match self.reconcile_record(locator, zone, name, current_ip).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(record = %name, "Failed to update record: {}", e);
                    UpdateOutcome::failed(name, current_ip, e.to_string())
                }
            };
            outcomes.push(outcome);
        }

        let report = CycleReport::new(current_ip, outcomes);
        debug!(
            targets = targets.len(),
            updated = report.total_updated,
            "Cycle complete"
        );
        report
    }

    /// Bring one record in line with `current_ip`
    ///
    /// Any `Err` is scoped to this record; the caller records it in the
    /// record's outcome and moves on.
    async fn reconcile_record(
        &self,
        locator: &RecordLocator<'_>,
        zone: &ZoneHandle,
        name: &str,
        current_ip: ResolvedIp,
    ) -> Result<UpdateOutcome> {
        let body = RecordInput::a(name, current_ip.to_string(), self.config.ttl);

        match locator.find_record(zone, name).await? {
            Some(existing) if current_ip.matches_content(&existing.content) => {
                info!(record = %name, %current_ip, "IP hasn't changed, no update needed");
                Ok(UpdateOutcome::unchanged(name, current_ip))
            }
            Some(existing) => {
                info!(
                    record = %name,
                    "Updating DNS record from {} to {}",
                    existing.content, current_ip
                );
                self.provider
                    .update_record(&zone.id, &existing.id, &body)
                    .await?;
                Ok(UpdateOutcome::stale(name, current_ip, existing.content))
            }
            None => {
                info!(record = %name, %current_ip, "Creating new DNS record");
                self.provider.create_record(&zone.id, &body).await?;
                Ok(UpdateOutcome::created(name, current_ip))
            }
        }
    }
}
