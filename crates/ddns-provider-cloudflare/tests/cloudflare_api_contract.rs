//! Contract Test: Cloudflare API v4
//!
//! Constraints verified:
//! - Every request carries the bearer token and hits the documented endpoint
//! - Envelopes are unwrapped into core types
//! - Non-2xx statuses and `success: false` envelopes become provider errors
//!   carrying the upstream message
//! - Dry-run mode reads but never writes
//! - A full engine cycle drives the provider end to end

use ddns_core::traits::{DnsProvider, IpSource, RecordFilter, RecordInput};
use ddns_core::{DdnsConfig, DdnsEngine, Error, IpResolver, OutcomeAction};
use ddns_provider_cloudflare::CloudflareProvider;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    }))
}

fn failure(status: u16, code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "success": false,
        "errors": [{ "code": code, "message": message }],
        "messages": [],
        "result": null,
    }))
}

fn record_json(id: &str, name: &str, content: &str, ttl: u32) -> Value {
    json!({
        "id": id,
        "zone_id": "zone-123",
        "zone_name": "example.com",
        "name": name,
        "type": "A",
        "content": content,
        "proxied": false,
        "ttl": ttl,
    })
}

fn provider(server: &MockServer) -> CloudflareProvider {
    CloudflareProvider::new_live(TOKEN)
        .expect("provider builds")
        .with_base_url(server.uri())
}

fn dry_run_provider(server: &MockServer) -> CloudflareProvider {
    CloudflareProvider::new_dry_run(TOKEN)
        .expect("provider builds")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn zone_lookup_sends_token_and_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "example.com"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ok(json!([{ "id": "zone-123", "name": "example.com", "status": "active" }])))
        .expect(1)
        .mount(&server)
        .await;

    let zones = provider(&server)
        .find_zone_by_name("example.com")
        .await
        .expect("lookup succeeds");

    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].id, "zone-123");
}

#[tokio::test]
async fn record_listing_applies_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone-123/dns_records"))
        .and(query_param("type", "A"))
        .and(query_param("name", "home.example.com"))
        .respond_with(ok(json!([record_json("rec-1", "home.example.com", "198.51.100.1", 1)])))
        .expect(1)
        .mount(&server)
        .await;

    let records = provider(&server)
        .list_records(
            "zone-123",
            &RecordFilter::a_records().with_name("home.example.com"),
        )
        .await
        .expect("listing succeeds");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "rec-1");
    assert_eq!(records[0].content, "198.51.100.1");
}

#[tokio::test]
async fn truncated_listing_returns_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone-123/dns_records"))
        .and(query_param("type", "A"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [record_json("rec-1", "local.a.example.com", "198.51.100.1", 1)],
            "result_info": { "page": 1, "per_page": 1, "count": 1, "total_count": 3 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = provider(&server)
        .list_records("zone-123", &RecordFilter::a_records().with_per_page(1))
        .await
        .expect("a truncated listing is not an error");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "local.a.example.com");
}

#[tokio::test]
async fn create_posts_record_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone-123/dns_records"))
        .and(body_json(json!({
            "type": "A",
            "name": "home.example.com",
            "content": "203.0.113.7",
            "ttl": 120,
        })))
        .respond_with(ok(record_json("rec-9", "home.example.com", "203.0.113.7", 120)))
        .expect(1)
        .mount(&server)
        .await;

    let created = provider(&server)
        .create_record(
            "zone-123",
            &RecordInput::a("home.example.com", "203.0.113.7", 120),
        )
        .await
        .expect("create succeeds");

    assert_eq!(created.id, "rec-9");
}

#[tokio::test]
async fn update_puts_to_record_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/zones/zone-123/dns_records/rec-1"))
        .respond_with(ok(record_json("rec-1", "dev.foo.example.com", "198.51.100.1", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let updated = provider(&server)
        .update_record(
            "zone-123",
            "rec-1",
            &RecordInput::a("dev.foo.example.com", "198.51.100.1", 1),
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.name, "dev.foo.example.com");
}

#[tokio::test]
async fn upstream_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(failure(403, 9109, "Invalid access token"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .find_zone_by_name("example.com")
        .await
        .expect_err("must fail");

    match err {
        Error::Provider { provider, message } => {
            assert_eq!(provider, "cloudflare");
            assert!(message.contains("Invalid access token"), "{}", message);
            assert!(message.contains("403"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn status_without_body_maps_to_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/zones/zone-123/dns_records/rec-1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server)
        .update_record(
            "zone-123",
            "rec-1",
            &RecordInput::a("home.example.com", "203.0.113.7", 1),
        )
        .await
        .expect_err("must fail");

    assert!(err.to_string().contains("Rate limit exceeded"), "{}", err);
    assert!(!err.is_cycle_fatal());
}

#[tokio::test]
async fn unsuccessful_envelope_with_ok_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone-123/dns_records"))
        .respond_with(failure(200, 81057, "Record already exists."))
        .mount(&server)
        .await;

    let err = provider(&server)
        .create_record(
            "zone-123",
            &RecordInput::a("home.example.com", "203.0.113.7", 1),
        )
        .await
        .expect_err("must fail");

    assert!(err.to_string().contains("Record already exists."), "{}", err);
}

#[tokio::test]
async fn malformed_body_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .find_zone_by_name("example.com")
        .await
        .expect_err("must fail");

    assert!(matches!(err, Error::Provider { .. }));
}

#[tokio::test]
async fn dry_run_never_writes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let provider = dry_run_provider(&server);
    let input = RecordInput::a("home.example.com", "203.0.113.7", 1);

    let created = provider
        .create_record("zone-123", &input)
        .await
        .expect("dry-run create succeeds");
    assert_eq!(created.content, "203.0.113.7");

    let updated = provider
        .update_record("zone-123", "rec-1", &input)
        .await
        .expect("dry-run update succeeds");
    assert_eq!(updated.id, "rec-1");
}

/// Reports a fixed address
struct FixedIp;

#[async_trait::async_trait]
impl IpSource for FixedIp {
    async fn fetch_candidate(&self) -> ddns_core::Result<String> {
        Ok("203.0.113.7".to_string())
    }

    fn describe(&self) -> &str {
        "fixed"
    }
}

#[tokio::test]
async fn engine_cycle_against_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "example.com"))
        .respond_with(ok(json!([{ "id": "zone-123", "name": "example.com" }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/zones/zone-123/dns_records"))
        .and(query_param("name", "stale.example.com"))
        .respond_with(ok(json!([record_json("rec-1", "stale.example.com", "198.51.100.1", 1)])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/zones/zone-123/dns_records"))
        .and(query_param("name", "fresh.example.com"))
        .respond_with(ok(json!([record_json("rec-2", "fresh.example.com", "203.0.113.7", 1)])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/zones/zone-123/dns_records"))
        .and(query_param("name", "new.example.com"))
        .respond_with(ok(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/zones/zone-123/dns_records/rec-1"))
        .respond_with(ok(record_json("rec-1", "stale.example.com", "203.0.113.7", 1)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/zones/zone-123/dns_records"))
        .respond_with(ok(record_json("rec-3", "new.example.com", "203.0.113.7", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let engine = DdnsEngine::new(
        IpResolver::new(vec![Box::new(FixedIp)]),
        Box::new(provider(&server)),
        DdnsConfig::explicit(
            "example.com",
            ["stale.example.com", "fresh.example.com", "new.example.com"],
        ),
    )
    .expect("engine builds");

    let report = engine.run_cycle().await.expect("cycle succeeds");

    let actions: Vec<OutcomeAction> = report.outcomes.iter().map(|o| o.action).collect();
    assert_eq!(
        actions,
        vec![
            OutcomeAction::Updated,
            OutcomeAction::Unchanged,
            OutcomeAction::Created
        ]
    );
    assert_eq!(report.total_updated, 2);
}
