// # IP Source Trait
//
// Defines the interface for a single public-IP lookup endpoint.
//
// ## Implementations
//
// - HTTP lookup services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let sources = /* Vec<Box<dyn IpSource>> */;
//     let resolver = IpResolver::new(sources);
//
//     // First source returning a valid IPv4 address wins
//     let ip = resolver.current_ip().await?;
//     println!("Current IP: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP lookup source implementations
///
/// A source performs exactly one lookup per call and reports the raw
/// candidate address it received. Validation of the candidate, failover
/// between sources and logging of failures are owned by
/// [`IpResolver`](crate::IpResolver).
///
/// # Rules
///
/// - ✅ One bounded-timeout request per call
/// - ✅ Extract the candidate from the source's own response format
/// - ❌ No caching between calls (every cycle re-resolves)
/// - ❌ No retries (the resolver moves on to the next source)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the caller's public address as reported by this source
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The raw, unvalidated candidate address
    /// - `Err(Error)`: Transport failure, timeout, or unusable response
    async fn fetch_candidate(&self) -> Result<String, crate::Error>;

    /// Human-readable identifier (usually the endpoint URL) for logging
    fn describe(&self) -> &str;
}
