// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare API v4 implementation of
// `ddns_core::traits::DnsProvider`.
//
// ## Behaviour
//
// - One HTTP request per capability call; no retries, no caching
// - Non-2xx statuses and `success: false` envelopes are errors, carrying the
//   first upstream error message when Cloudflare sends one
// - Dry-run mode performs every read but only logs writes
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Construction fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...&per_page=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

mod api;

use api::{Envelope, ErrorEnvelope, first_error};
use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, RecordFilter, RecordInput, RemoteRecord, Zone};
use ddns_core::{Error, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for API requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const PROVIDER: &str = "cloudflare";

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PUT payload
/// - **NOT** modify any DNS record, answering writes with a record that
///   echoes the request
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API root, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform reads but skip writes
    dry_run: bool,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `dry_run`: If true, perform reads but skip writes
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider in live mode
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, false)
    }

    /// Create a provider in dry-run mode
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, true)
    }

    /// Point the provider at a different API root (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authenticated request and unwrap the response envelope
    ///
    /// `context` names the operation in error messages.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> Result<T> {
        let (result, _) = self.send_with_info(request, context).await?;
        Ok(result)
    }

    async fn send_with_info<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<(T, Option<api::ResultInfo>)> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("{}: HTTP request failed: {}", context, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("{}: Failed to read response: {}", context, e)))?;

        if !status.is_success() {
            let upstream = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| first_error(&envelope.errors));
            return Err(status_error(status, upstream, context));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| Error::provider(PROVIDER, format!("{}: Failed to parse response: {}", context, e)))?;

        if !envelope.success {
            let message = first_error(&envelope.errors)
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(Error::provider(PROVIDER, format!("{}: {}", context, message)));
        }

        let result = envelope.result.ok_or_else(|| {
            Error::provider(PROVIDER, format!("{}: Invalid response format: result is missing", context))
        })?;

        Ok((result, envelope.result_info))
    }

    /// Answer a suppressed write with the record it would have produced
    fn dry_run_record(&self, method: &str, url: &str, id: &str, record: &RecordInput) -> Result<RemoteRecord> {
        let payload = serde_json::to_string(record)
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to encode payload: {}", e)))?;
        info!("[DRY-RUN] Would send {} request to {} with payload: {}", method, url, payload);

        Ok(RemoteRecord {
            id: id.to_string(),
            name: record.name.clone(),
            content: record.content.clone(),
            ttl: record.ttl,
            record_type: record.record_type.clone(),
        })
    }
}

/// Map a non-2xx status to a provider error
///
/// The upstream message wins when Cloudflare sent one.
fn status_error(status: StatusCode, upstream: Option<String>, context: &str) -> Error {
    let message = match (upstream, status.as_u16()) {
        (Some(upstream), _) => format!("{}. Status: {}", upstream, status),
        (None, 401 | 403) => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
            status
        ),
        (None, 404) => format!("Resource not found. Status: {}", status),
        (None, 409) => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        (None, 429) => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        (None, 500..=599) => format!("Cloudflare server error (transient). Status: {}", status),
        (None, _) => format!("Unexpected status: {}", status),
    };

    Error::provider(PROVIDER, format!("{}: {}", context, message))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn find_zone_by_name(&self, name: &str) -> Result<Vec<Zone>> {
        debug!(zone = name, "Looking up zone");

        let request = self.client.get(self.url("/zones")).query(&[("name", name)]);
        self.send(request, "Zone lookup failed").await
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, zone_id: &str, filter: &RecordFilter) -> Result<Vec<RemoteRecord>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(ref record_type) = filter.record_type {
            query.push(("type", record_type.clone()));
        }
        if let Some(ref name) = filter.name {
            query.push(("name", name.clone()));
        }
        if let Some(per_page) = filter.per_page {
            query.push(("per_page", per_page.to_string()));
        }

        let request = self
            .client
            .get(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .query(&query);

        let (records, info): (Vec<RemoteRecord>, _) =
            self.send_with_info(request, "Record lookup failed").await?;

        if let Some(info) = info {
            debug!(
                page = info.page,
                per_page = info.per_page,
                count = info.count,
                total_count = info.total_count,
                "Listed DNS records"
            );
            if info.is_truncated() {
                warn!(
                    zone_id,
                    returned = info.count,
                    total = info.total_count,
                    "Record listing truncated to one page"
                );
            }
        }

        Ok(records)
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1 }
    /// ```
    async fn create_record(&self, zone_id: &str, record: &RecordInput) -> Result<RemoteRecord> {
        let url = self.url(&format!("/zones/{}/dns_records", zone_id));

        if self.dry_run {
            return self.dry_run_record("POST", &url, "dry-run", record);
        }

        let request = self.client.post(&url).json(record);
        let created: RemoteRecord = self.send(request, "Failed to create record").await?;

        debug!(record = %created.name, id = %created.id, "DNS record created");
        Ok(created)
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1 }
    /// ```
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordInput,
    ) -> Result<RemoteRecord> {
        let url = self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id));

        if self.dry_run {
            return self.dry_run_record("PUT", &url, record_id, record);
        }

        let request = self.client.put(&url).json(record);
        let updated: RemoteRecord = self.send(request, "Failed to update record").await?;

        debug!(record = %updated.name, id = %updated.id, "DNS record updated");
        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
