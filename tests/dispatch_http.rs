//! Dispatcher and client tests against a fake JADX HTTP API.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use common::FakeJadx;
use jadx_mcp::client::{ClientSettings, JadxClient};
use jadx_mcp::mcp::dispatch::{Dispatcher, ToolOutput};
use jadx_mcp::mcp::registry::{
    FIND_XREF_OF_METHOD, GET_ALL_CLASSES, GET_CLASS_CODE, GET_FIELDS_OF_CLASS, GET_METHOD_CODE,
    SEARCH_METHOD_BY_NAME,
};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dispatcher(base_url: &str) -> Dispatcher {
    let client = JadxClient::new(ClientSettings::new(base_url, Duration::from_secs(2))).unwrap();
    Dispatcher::new(client)
}

fn lines(items: &[&str]) -> ToolOutput {
    ToolOutput::Lines(items.iter().map(|s| s.to_string()).collect())
}

// ===========================================================================
// 1. Shaping
// ===========================================================================

#[tokio::test]
async fn all_classes_are_split_into_lines() {
    let fake = FakeJadx::start(&[("get_all_classes", 200, "com.a.A\ncom.a.B")]);
    let resp = dispatcher(&fake.base_url).run(&GET_ALL_CLASSES, &[]).await;
    assert!(!resp.is_error);
    assert_eq!(resp.output, lines(&["com.a.A", "com.a.B"]));

    let reqs = fake.requests();
    assert_eq!(reqs.len(), 1);
    assert!(reqs[0].query.is_empty());
}

#[tokio::test]
async fn missing_class_gives_sentinel_text() {
    let fake = FakeJadx::start(&[("get_class_code", 404, "Class com.a.Missing not found")]);
    let resp = dispatcher(&fake.base_url)
        .run(&GET_CLASS_CODE, &["com.a.Missing"])
        .await;
    assert!(resp.is_error);
    match resp.output {
        ToolOutput::Text(text) => {
            assert!(text.starts_with("Error: "), "got {text}");
            assert!(text.contains("404"));
            assert!(text.contains("not found"));
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[tokio::test]
async fn class_without_fields_is_empty_list() {
    let fake = FakeJadx::start(&[("get_fields_of_class", 200, "")]);
    let resp = dispatcher(&fake.base_url)
        .run(&GET_FIELDS_OF_CLASS, &["com.a.Empty"])
        .await;
    assert!(!resp.is_error);
    assert_eq!(resp.output, lines(&[]));
}

#[tokio::test]
async fn xrefs_are_split_into_lines() {
    let fake = FakeJadx::start(&[("find_xref_of_method", 200, "com.a.B#bar\ncom.a.C#baz")]);
    let resp = dispatcher(&fake.base_url)
        .run(&FIND_XREF_OF_METHOD, &["com.a.A", "foo"])
        .await;
    assert_eq!(resp.output, lines(&["com.a.B#bar", "com.a.C#baz"]));

    let req = &fake.requests()[0];
    assert_eq!(req.endpoint, "find_xref_of_method");
    assert_eq!(req.query.get("class").map(String::as_str), Some("com.a.A"));
    assert_eq!(req.query.get("method").map(String::as_str), Some("foo"));
}

#[tokio::test]
async fn method_code_is_verbatim() {
    let code = "public void onCreate(Bundle b) {\r\n    super.onCreate(b);\r\n}\r\n";
    let fake = FakeJadx::start(&[("get_method_code", 200, code)]);
    let resp = dispatcher(&fake.base_url)
        .run(&GET_METHOD_CODE, &["com.a.MainActivity", "onCreate"])
        .await;
    assert_eq!(resp.output, ToolOutput::Text(code.to_string()));
}

#[tokio::test]
async fn query_values_are_encoded() {
    let fake = FakeJadx::start(&[("search_method_by_name", 200, "com.a.A$Inner.<init>")]);
    let resp = dispatcher(&fake.base_url)
        .run(&SEARCH_METHOD_BY_NAME, &["<init> & more"])
        .await;
    assert_eq!(resp.output, lines(&["com.a.A$Inner.<init>"]));
    assert_eq!(
        fake.requests()[0].query.get("method").map(String::as_str),
        Some("<init> & more")
    );
}

// ===========================================================================
// 2. Failure handling
// ===========================================================================

#[tokio::test]
async fn server_error_on_list_is_single_entry() {
    let fake = FakeJadx::start(&[("get_all_classes", 503, "")]);
    let resp = dispatcher(&fake.base_url).run(&GET_ALL_CLASSES, &[]).await;
    assert!(resp.is_error);
    match resp.output {
        ToolOutput::Lines(entries) => {
            assert_eq!(entries.len(), 1);
            assert!(entries[0].starts_with("Error: HTTP status 503"));
        }
        other => panic!("expected lines, got {other:?}"),
    }
}

#[tokio::test]
async fn silent_decompiler_times_out_into_sentinel() {
    let base = common::silent_jadx();
    let client = JadxClient::new(ClientSettings::new(base, Duration::from_secs(1))).unwrap();
    let started = std::time::Instant::now();
    let resp = Dispatcher::new(client).run(&GET_ALL_CLASSES, &[]).await;
    assert!(started.elapsed() < Duration::from_secs(10));

    assert!(resp.is_error);
    match resp.output {
        ToolOutput::Lines(entries) => {
            assert_eq!(entries.len(), 1);
            assert!(entries[0].starts_with("Error: "), "got {}", entries[0]);
            assert!(entries[0].contains("timed out"), "got {}", entries[0]);
        }
        other => panic!("expected lines, got {other:?}"),
    }
}

#[tokio::test]
async fn one_line_success_is_not_an_error() {
    // A real single-line result and a failure are told apart by the flag.
    let fake = FakeJadx::start(&[("get_all_classes", 200, "Error: looks like one")]);
    let resp = dispatcher(&fake.base_url).run(&GET_ALL_CLASSES, &[]).await;
    assert!(!resp.is_error);
    assert_eq!(resp.output, lines(&["Error: looks like one"]));
}

#[tokio::test]
async fn calls_are_idempotent() {
    let fake = FakeJadx::start(&[("get_all_classes", 200, "com.a.A\n")]);
    let d = dispatcher(&fake.base_url);
    let first = d.run(&GET_ALL_CLASSES, &[]).await;
    let second = d.run(&GET_ALL_CLASSES, &[]).await;
    assert_eq!(first, second);
    assert_eq!(fake.requests().len(), 2);
}

// ===========================================================================
// 3. Named invocation
// ===========================================================================

#[tokio::test]
async fn call_by_name_maps_argument_names_to_query_keys() {
    let fake = FakeJadx::start(&[("get_implementation_of_interface", 200, "com.a.Impl")]);
    let args: HashMap<String, String> = [("interface_name".to_string(), "com.a.Api".to_string())]
        .into_iter()
        .collect();
    let resp = dispatcher(&fake.base_url)
        .call_by_name("get_implementation_of_interface", &args)
        .await
        .unwrap();
    assert_eq!(resp.output, lines(&["com.a.Impl"]));
    assert_eq!(
        fake.requests()[0].query.get("interface").map(String::as_str),
        Some("com.a.Api")
    );
}

// ===========================================================================
// 4. Raw client
// ===========================================================================

#[tokio::test]
async fn trailing_slash_base_targets_clean_url() {
    let fake = FakeJadx::start(&[("get_all_classes", 200, "com.a.A")]);
    let client = JadxClient::new(ClientSettings::new(
        format!("{}/", fake.base_url),
        Duration::from_secs(2),
    ))
    .unwrap();
    assert_eq!(
        client.endpoint_url("get_all_classes"),
        format!("{}/get_all_classes", fake.base_url)
    );
    assert_eq!(client.fetch("get_all_classes", &[]).await, "com.a.A");
}

#[tokio::test]
async fn submit_posts_json_body() {
    let fake = FakeJadx::start(&[("rename", 200, "ok")]);
    let client = JadxClient::new(ClientSettings::new(&fake.base_url, Duration::from_secs(2))).unwrap();
    let body = serde_json::json!({ "class": "com.a.A", "newName": "Main" });
    assert_eq!(client.submit("rename", Some(&body)).await, "ok");

    let req = &fake.requests()[0];
    assert_eq!(req.method, axum::http::Method::POST);
    let sent: serde_json::Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn submit_failure_is_sentinel() {
    let fake = FakeJadx::start(&[]);
    let client = JadxClient::new(ClientSettings::new(&fake.base_url, Duration::from_secs(2))).unwrap();
    let out = client.submit::<serde_json::Value>("rename", None).await;
    assert!(out.starts_with("Error: HTTP status 404"), "got {out}");
}
