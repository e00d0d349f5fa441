//! Test doubles and common utilities for contract tests
//!
//! The doubles share their state through `Arc`s so a test can hand a clone
//! to the engine and keep the original to inspect recorded calls.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, IpSource, RecordFilter, RecordInput, RemoteRecord, Zone};
use ddns_core::{DdnsConfig, DdnsEngine, IpResolver};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: &str = "zone-123";
pub const ZONE: &str = "example.com";

/// A provider call, as recorded by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindZone(String),
    List {
        zone_id: String,
        name: Option<String>,
    },
    Create {
        zone_id: String,
        input: RecordInput,
    },
    Update {
        zone_id: String,
        record_id: String,
        input: RecordInput,
    },
}

/// In-memory provider holding a single zone
#[derive(Clone)]
pub struct MockDnsProvider {
    zones: Arc<Mutex<Vec<Zone>>>,
    records: Arc<Mutex<Vec<RemoteRecord>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    failing_lookups: Arc<Mutex<HashSet<String>>>,
    failing_list: Arc<Mutex<bool>>,
    next_id: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    /// A provider with the zone [`ZONE`] and no records
    pub fn new() -> Self {
        Self {
            zones: Arc::new(Mutex::new(vec![Zone {
                id: ZONE_ID.to_string(),
                name: ZONE.to_string(),
            }])),
            records: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_writes: Arc::new(Mutex::new(HashSet::new())),
            failing_lookups: Arc::new(Mutex::new(HashSet::new())),
            failing_list: Arc::new(Mutex::new(false)),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// A provider that knows no zones at all
    pub fn without_zone() -> Self {
        let provider = Self::new();
        provider.zones.lock().unwrap().clear();
        provider
    }

    /// Seed an A record
    pub fn with_record(self, name: &str, content: &str) -> Self {
        self.with_record_ttl(name, content, 1)
    }

    /// Seed an A record with a specific TTL
    pub fn with_record_ttl(self, name: &str, content: &str, ttl: u32) -> Self {
        let id = self.allocate_id();
        self.records.lock().unwrap().push(RemoteRecord {
            id,
            name: name.to_string(),
            content: content.to_string(),
            ttl,
            record_type: "A".to_string(),
        });
        self
    }

    /// Make create/update calls touching `name` fail
    pub fn failing_writes_for(self, name: &str) -> Self {
        self.failing_writes.lock().unwrap().insert(name.to_string());
        self
    }

    /// Make exact-name lookups of `name` fail
    pub fn failing_lookups_for(self, name: &str) -> Self {
        self.failing_lookups.lock().unwrap().insert(name.to_string());
        self
    }

    /// Make zone-wide listings fail
    pub fn failing_list(self) -> Self {
        *self.failing_list.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn zone_lookup_count(&self) -> usize {
        self.count(|call| matches!(call, Call::FindZone(_)))
    }

    pub fn create_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Create { .. }))
    }

    pub fn update_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Update { .. }))
    }

    /// Number of mutating calls (create + update)
    pub fn write_count(&self) -> usize {
        self.create_count() + self.update_count()
    }

    /// Current remote state of `name`
    pub fn record(&self, name: &str) -> Option<RemoteRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.name == name)
            .cloned()
    }

    pub fn records(&self) -> Vec<RemoteRecord> {
        self.records.lock().unwrap().clone()
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn allocate_id(&self) -> String {
        format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_fails(&self, names: &[&str]) -> bool {
        let failing = self.failing_writes.lock().unwrap();
        names.iter().any(|name| failing.contains(*name))
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn find_zone_by_name(&self, name: &str) -> Result<Vec<Zone>> {
        self.record_call(Call::FindZone(name.to_string()));
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|zone| zone.name.eq_ignore_ascii_case(name))
            .cloned()
            .collect())
    }

    async fn list_records(&self, zone_id: &str, filter: &RecordFilter) -> Result<Vec<RemoteRecord>> {
        self.record_call(Call::List {
            zone_id: zone_id.to_string(),
            name: filter.name.clone(),
        });

        match &filter.name {
            Some(name) if self.failing_lookups.lock().unwrap().contains(name) => {
                return Err(Error::provider("mock", format!("lookup of {} rejected", name)));
            }
            None if *self.failing_list.lock().unwrap() => {
                return Err(Error::provider("mock", "listing rejected"));
            }
            _ => {}
        }

        let mut records: Vec<RemoteRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| {
                filter
                    .name
                    .as_ref()
                    .is_none_or(|name| record.name.eq_ignore_ascii_case(name))
            })
            .filter(|record| {
                filter
                    .record_type
                    .as_ref()
                    .is_none_or(|record_type| &record.record_type == record_type)
            })
            .cloned()
            .collect();

        if let Some(per_page) = filter.per_page {
            records.truncate(per_page as usize);
        }

        Ok(records)
    }

    async fn create_record(&self, zone_id: &str, record: &RecordInput) -> Result<RemoteRecord> {
        self.record_call(Call::Create {
            zone_id: zone_id.to_string(),
            input: record.clone(),
        });

        if self.write_fails(&[record.name.as_str()]) {
            return Err(Error::provider("mock", format!("create of {} rejected", record.name)));
        }

        let created = RemoteRecord {
            id: self.allocate_id(),
            name: record.name.clone(),
            content: record.content.clone(),
            ttl: record.ttl,
            record_type: record.record_type.clone(),
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordInput,
    ) -> Result<RemoteRecord> {
        self.record_call(Call::Update {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            input: record.clone(),
        });

        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|existing| existing.id == record_id)
            .ok_or_else(|| Error::provider("mock", format!("no record with id {}", record_id)))?;

        if self.write_fails(&[record.name.as_str(), existing.name.as_str()]) {
            return Err(Error::provider("mock", format!("update of {} rejected", existing.name)));
        }

        existing.name = record.name.clone();
        existing.content = record.content.clone();
        existing.ttl = record.ttl;
        existing.record_type = record.record_type.clone();
        Ok(existing.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IP source that always reports the same candidate
#[derive(Clone)]
pub struct StaticIpSource {
    candidate: String,
    calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(candidate: &str) -> Self {
        Self {
            candidate: candidate.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn fetch_candidate(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidate.clone())
    }

    fn describe(&self) -> &str {
        "static"
    }
}

/// An IP source whose every lookup fails
#[derive(Clone, Default)]
pub struct FailingIpSource {
    calls: Arc<AtomicUsize>,
}

impl FailingIpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FailingIpSource {
    async fn fetch_candidate(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::http("connection refused"))
    }

    fn describe(&self) -> &str {
        "failing"
    }
}

/// Route library logs to the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Resolver with a single static source
pub fn static_resolver(ip: &str) -> IpResolver {
    IpResolver::new(vec![Box::new(StaticIpSource::new(ip))])
}

/// Engine over a clone of `provider`
pub fn engine(provider: &MockDnsProvider, resolver: IpResolver, config: DdnsConfig) -> DdnsEngine {
    DdnsEngine::new(resolver, Box::new(provider.clone()), config).expect("engine construction succeeds")
}

/// Config managing `names` under [`ZONE`]
pub fn explicit_config(names: &[&str]) -> DdnsConfig {
    DdnsConfig::explicit(ZONE, names.iter().copied())
}
