//! Request shapes produced by both Knack clients, observed through a
//! recording transport. No network is involved.

mod common;

use std::num::NonZeroU32;

use common::RecordingTransport;
use knack_core::{
    FilterOptions, FilterRule, HttpMethod, KnackApiClient, KnackApiConfig, KnackViewClient, KnackViewConfig,
    RequestOptions, SortOrder, DEFAULT_API_BASE_URL,
};
use serde_json::{json, Value};

fn api_client(reply: &str) -> KnackApiClient<RecordingTransport> {
    KnackApiClient::with_transport(
        KnackApiConfig::new("test-app-id", "test-api-key"),
        RecordingTransport::replying(reply),
    )
}

fn view_client(reply: &str) -> KnackViewClient<RecordingTransport> {
    KnackViewClient::with_transport(
        KnackViewConfig::new("test-app-id", "test-token"),
        RecordingTransport::replying(reply),
    )
}

fn url(path: &str) -> String {
    format!("{DEFAULT_API_BASE_URL}{path}")
}

fn full_options() -> RequestOptions {
    RequestOptions::new()
        .sort("field_1", SortOrder::Asc)
        .paginate(NonZeroU32::new(10).unwrap(), NonZeroU32::new(1).unwrap())
        .filters(FilterOptions::all(vec![FilterRule::new("field_1", "is", "test")]))
}

fn full_query() -> Vec<(String, String)> {
    vec![
        ("sort_field".to_string(), "field_1".to_string()),
        ("sort_order".to_string(), "asc".to_string()),
        ("rows_per_page".to_string(), "10".to_string()),
        ("page".to_string(), "1".to_string()),
        (
            "filters".to_string(),
            r#"{"match":"and","rules":[{"field":"field_1","operator":"is","value":"test"}]}"#.to_string(),
        ),
    ]
}

fn body_json(body: Option<&str>) -> Value {
    serde_json::from_str(body.expect("request should carry a body")).unwrap()
}

// ---------------------------------------------------------------------------
// Object mode
// ---------------------------------------------------------------------------

#[test]
fn object_get_records_sends_empty_query() {
    let client = api_client(r#"{"records":[]}"#);
    let page: Value = client.get_records("object_1", None).unwrap();
    assert_eq!(page, json!({"records": []}));

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, url("/objects/object_1/records"));
    assert_eq!(req.query, Some(Vec::new()));
    assert!(req.body.is_none());
}

#[test]
fn object_get_records_serializes_filters() {
    let client = api_client(r#"{"records":[]}"#);
    let _: Value = client.get_records("object_1", Some(&full_options())).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.url, url("/objects/object_1/records"));
    assert_eq!(req.query, Some(full_query()));
}

#[test]
fn object_get_record_has_no_query() {
    let client = api_client(r#"{"id":"123"}"#);
    let record: Value = client.get_record("object_1", "123").unwrap();
    assert_eq!(record["id"], "123");

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, url("/objects/object_1/records/123"));
    assert_eq!(req.query, None);
}

#[test]
fn object_create_record_posts_record_unchanged() {
    let client = api_client(r#"{"id":"123","field_1":"test"}"#);
    let record = json!({"field_1": "test"});
    let _: Value = client.create_record("object_1", &record).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, url("/objects/object_1/records"));
    assert_eq!(req.query, None);
    assert_eq!(body_json(req.body.as_deref()), record);
}

#[test]
fn object_update_record_puts_record() {
    let client = api_client(r#"{"id":"123","field_1":"test"}"#);
    let record = json!({"field_1": "test"});
    let _: Value = client.update_record("object_1", "123", &record).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(req.url, url("/objects/object_1/records/123"));
    assert_eq!(body_json(req.body.as_deref()), record);
}

#[test]
fn object_delete_record_has_no_body_or_query() {
    let client = api_client("{}");
    let _: Value = client.delete_record("object_1", "123").unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.url, url("/objects/object_1/records/123"));
    assert_eq!(req.query, None);
    assert!(req.body.is_none());
}

#[test]
fn object_requests_carry_api_key_headers() {
    let client = api_client("{}");
    let _: Value = client.get_record("object_1", "1").unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("X-Knack-Application-Id"), Some("test-app-id"));
    assert_eq!(req.header("X-Knack-REST-API-Key"), Some("test-api-key"));
    assert_eq!(req.header("Authorization"), None);
}

#[test]
fn typed_records_serialize_with_serde() {
    #[derive(serde::Serialize)]
    struct Contact {
        field_1: String,
        field_2: u32,
    }

    let client = api_client("{}");
    let contact = Contact {
        field_1: "Ada".to_string(),
        field_2: 36,
    };
    let _: Value = client.create_record("object_2", &contact).unwrap();

    let req = client.http().transport().single();
    assert_eq!(body_json(req.body.as_deref()), json!({"field_1": "Ada", "field_2": 36}));
}

// ---------------------------------------------------------------------------
// View mode
// ---------------------------------------------------------------------------

#[test]
fn view_get_records_sends_empty_query() {
    let client = view_client(r#"{"records":[]}"#);
    let _: Value = client.get_records("scene_1", "view_1", None).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, url("/pages/scene_1/views/view_1/records"));
    assert_eq!(req.query, Some(Vec::new()));
}

#[test]
fn view_get_records_serializes_filters() {
    let client = view_client(r#"{"records":[]}"#);
    let _: Value = client.get_records("scene_1", "view_1", Some(&full_options())).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.query, Some(full_query()));
}

#[test]
fn view_get_record_has_no_query() {
    let client = view_client(r#"{"id":"123"}"#);
    let _: Value = client.get_record("scene_1", "view_1", "123").unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.url, url("/pages/scene_1/views/view_1/records/123"));
    assert_eq!(req.query, None);
}

#[test]
fn view_create_record_posts_record_unchanged() {
    let client = view_client(r#"{"id":"123"}"#);
    let record = json!({"field_1": "test"});
    let _: Value = client.create_record("scene_1", "view_1", &record).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, url("/pages/scene_1/views/view_1/records"));
    assert_eq!(body_json(req.body.as_deref()), record);
}

#[test]
fn view_update_record_puts_record() {
    let client = view_client(r#"{"id":"123"}"#);
    let record = json!({"field_1": "test"});
    let _: Value = client.update_record("scene_1", "view_1", "123", &record).unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(req.url, url("/pages/scene_1/views/view_1/records/123"));
    assert_eq!(body_json(req.body.as_deref()), record);
}

#[test]
fn view_delete_record_has_no_body_or_query() {
    let client = view_client("{}");
    let _: Value = client.delete_record("scene_1", "view_1", "123").unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.url, url("/pages/scene_1/views/view_1/records/123"));
    assert_eq!(req.query, None);
    assert!(req.body.is_none());
}

#[test]
fn view_requests_use_raw_token_and_no_api_key() {
    let client = view_client("{}");
    let _: Value = client.get_record("scene_1", "view_1", "1").unwrap();

    let req = client.http().transport().single();
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("X-Knack-Application-Id"), Some("test-app-id"));
    assert_eq!(req.header("Authorization"), Some("test-token"));
    assert_eq!(req.header("X-Knack-REST-API-Key"), None);
}

#[test]
fn clients_can_be_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<KnackApiClient>();
    assert_send_sync::<KnackViewClient>();
}
