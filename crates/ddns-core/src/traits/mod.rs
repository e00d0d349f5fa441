//! Core traits for the DDNS reconciler
//!
//! This module defines the capability interfaces the core consumes.
//!
//! - [`IpSource`]: One public-IP lookup endpoint
//! - [`DnsProvider`]: Zone and record operations of a DNS provider

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{
    DnsProvider, RecordFilter, RecordInput, RemoteRecord, Zone, RECORD_TYPE_A,
};
