// # ddns-core
//
// Reconciliation engine for keeping DNS A records pointed at the current
// public IPv4 address of this host.
//
// ## Architecture Overview
//
// - **IpSource** / **IpResolver**: Ordered public-IP lookup with failover
// - **DnsProvider**: Narrow capability interface to a DNS provider
// - **RecordLocator**: Zone lookup, exact-name lookup, pattern discovery
// - **DdnsEngine**: Diffs current IP against remote records, applies the
//   minimal create/update per record, reports per-record outcomes
// - **RenameTransaction**: One-shot retargeting of pattern-matched records
// - **Scheduler**: Interval-driven cycles with graceful shutdown
//
// ## Design Principles
//
// 1. **Failure isolation**: One record's failure never blocks another
// 2. **Idempotence**: Unchanged records cause zero mutating calls
// 3. **Stateless cycles**: IP and zone are re-resolved every cycle
// 4. **Library-First**: The binary is a thin wiring layer

pub mod traits;
pub mod engine;
pub mod resolver;
pub mod locator;
pub mod rename;
pub mod scheduler;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource};
pub use engine::{CycleReport, DdnsEngine, OutcomeAction, RenameReport, UpdateOutcome};
pub use resolver::{IpResolver, ResolvedIp};
pub use locator::{RecordLocator, ZoneHandle};
pub use rename::RenameTransaction;
pub use scheduler::{Scheduler, SchedulerState};
pub use config::{DdnsConfig, RecordTargets};
pub use error::{Error, Result};
