// # HTTP IP Source
//
// This crate provides HTTP lookup-service IP sources for the DDNS reconciler.
//
// ## Purpose
//
// Each [`HttpIpSource`] asks one public "what is my IP" endpoint for the
// caller's address. [`default_sources`] returns the ordered failover list the
// binary hands to `ddns_core::IpResolver`.
//
// ## Response Formats
//
// - JSON object with an `ip` field (ipify, ipinfo)
// - JSON object with an `origin` field (httpbin)
// - Plain-text body containing just the address
//
// The candidate is returned unvalidated; `IpResolver` decides whether it is
// a usable IPv4 address.

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

/// Per-request timeout for lookup services
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default lookup services, in failover order
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org?format=json",
    "https://api4.ipify.org?format=json",
    "https://ipinfo.io/json",
    "https://httpbin.org/ip",
];

/// HTTP-based IP source for a single lookup endpoint
pub struct HttpIpSource {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Lookup endpoint (e.g., "https://api.ipify.org?format=json")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(url, client))
    }

    /// Create a source sharing an existing client
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// The endpoint this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn fetch_candidate(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!("HTTP error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        let candidate = extract_candidate(&body)?;
        debug!(url = %self.url, candidate = %candidate, "Lookup service answered");
        Ok(candidate)
    }

    fn describe(&self) -> &str {
        &self.url
    }
}

/// Pull the address out of a lookup service's response body
///
/// JSON objects must carry `ip` or `origin`; anything that is not a JSON
/// object is treated as a plain-text address.
pub fn extract_candidate(body: &str) -> Result<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => ["ip", "origin"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| Error::http("Response has neither an 'ip' nor an 'origin' field")),
        _ => Ok(body.trim().to_string()),
    }
}

/// Build the default ordered list of lookup sources
///
/// All sources share one HTTP client.
pub fn default_sources() -> Result<Vec<Box<dyn IpSource>>> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

    Ok(DEFAULT_IP_SERVICES
        .iter()
        .map(|url| Box::new(HttpIpSource::with_client(*url, client.clone())) as Box<dyn IpSource>)
        .collect())
}
