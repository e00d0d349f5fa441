//! Per-cycle and per-transaction reports
//!
//! Reports are created at the start of a cycle or rename and discarded once
//! the caller has logged them. Nothing here is persisted.

use crate::resolver::ResolvedIp;
use crate::traits::RemoteRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the engine did for one target record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeAction {
    /// Remote content already matched; no write issued
    Unchanged,
    /// Existing record rewritten with the current IP
    Updated,
    /// Record did not exist and was created
    Created,
    /// Lookup or write failed for this record
    Failed,
}

/// Outcome for a single target record in one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Target record name
    pub record_name: String,
    /// Action taken
    pub action: OutcomeAction,
    /// IP the record was reconciled against
    pub current_ip: ResolvedIp,
    /// Remote content before an update
    pub previous_ip: Option<String>,
    /// Failure message, set only for [`OutcomeAction::Failed`]
    pub error: Option<String>,
}

impl UpdateOutcome {
    pub(crate) fn unchanged(record_name: &str, current_ip: ResolvedIp) -> Self {
        Self::new(record_name, OutcomeAction::Unchanged, current_ip, None, None)
    }

    pub(crate) fn stale(record_name: &str, current_ip: ResolvedIp, previous_ip: String) -> Self {
        Self::new(
            record_name,
            OutcomeAction::Updated,
            current_ip,
            Some(previous_ip),
            None,
        )
    }

    pub(crate) fn created(record_name: &str, current_ip: ResolvedIp) -> Self {
        Self::new(record_name, OutcomeAction::Created, current_ip, None, None)
    }

    pub(crate) fn failed(record_name: &str, current_ip: ResolvedIp, error: String) -> Self {
        Self::new(
            record_name,
            OutcomeAction::Failed,
            current_ip,
            None,
            Some(error),
        )
    }

    fn new(
        record_name: &str,
        action: OutcomeAction,
        current_ip: ResolvedIp,
        previous_ip: Option<String>,
        error: Option<String>,
    ) -> Self {
        Self {
            record_name: record_name.to_string(),
            action,
            current_ip,
            previous_ip,
            error,
        }
    }

    /// Whether a create or update call succeeded for this record
    pub fn updated(&self) -> bool {
        matches!(self.action, OutcomeAction::Updated | OutcomeAction::Created)
    }

    /// Whether this record failed
    pub fn is_failure(&self) -> bool {
        self.action == OutcomeAction::Failed
    }
}

/// Result of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// IP every target was reconciled against
    pub current_ip: ResolvedIp,
    /// One outcome per target, in target order
    pub outcomes: Vec<UpdateOutcome>,
    /// Number of outcomes with a successful create or update
    pub total_updated: usize,
    /// When the cycle finished
    pub checked_at: DateTime<Utc>,
}

impl CycleReport {
    pub(crate) fn new(current_ip: ResolvedIp, outcomes: Vec<UpdateOutcome>) -> Self {
        let total_updated = outcomes.iter().filter(|o| o.updated()).count();
        Self {
            current_ip,
            outcomes,
            total_updated,
            checked_at: Utc::now(),
        }
    }

    /// Outcomes that failed
    pub fn failed(&self) -> impl Iterator<Item = &UpdateOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Whether every target was processed without error
    pub fn is_clean(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Result of a rename transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    /// Records as returned by the provider after renaming
    pub renamed: Vec<RemoteRecord>,
    /// One message per record that could not be renamed
    pub errors: Vec<String>,
}

impl RenameReport {
    /// Number of records renamed
    pub fn renamed_count(&self) -> usize {
        self.renamed.len()
    }

    /// Whether every matched record was renamed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
