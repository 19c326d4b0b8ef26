//! End-to-end tests through the request-object adapter.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::Value;

use axum::http::StatusCode;

use serverless_proxy::chain::DenyPathFilter;
use serverless_proxy::config::parse_config;
use serverless_proxy::platform::{HttpRequestMessage, MessageBody};
use serverless_proxy::{Invoker, LazyFacade, ProxyBuilder, ProxyConfig, RequestObjectAdapter};

use common::{echo_router, CountingEcho};

fn router_invoker(config: ProxyConfig) -> Invoker<RequestObjectAdapter> {
    let adapter = RequestObjectAdapter::new(&config.request_object);
    let facade = Arc::new(LazyFacade::new(move || {
        ProxyBuilder::new(config.clone()).build_router(echo_router())
    }));
    Invoker::new(adapter, facade)
}

fn json_body(body: Option<&MessageBody>) -> Value {
    match body {
        Some(MessageBody::Text(text)) => serde_json::from_str(text).unwrap(),
        other => panic!("expected a text body, got {other:?}"),
    }
}

#[test]
fn test_prefixed_route_reaches_application_path() {
    let invoker = router_invoker(ProxyConfig::default());
    let message = HttpRequestMessage::new(
        "POST",
        "https://example.azurewebsites.net/api/AzureWebAdapter/orders/42?expand=items",
    )
    .header("Content-Type", "application/json")
    .body(r#"{"qty":2}"#);

    let reply = invoker.invoke(message).unwrap();
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.header("content-type"), Some("application/json"));

    let body = json_body(reply.body());
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/orders/42");
    assert_eq!(body["query"], "expand=items");
    assert_eq!(body["body"], r#"{"qty":2}"#);
}

#[test]
fn test_pets_query_map() {
    let invoker = router_invoker(ProxyConfig::default());
    let message = HttpRequestMessage::new("GET", "/api/AzureWebAdapter/pets")
        .query_parameter("foo", "bar");

    let reply = invoker.invoke(message).unwrap();
    let body = json_body(reply.body());
    assert_eq!(body["query"], serde_json::json!([["foo", "bar"]]));
}

#[test]
fn test_custom_prefix() {
    let config = parse_config("[request_object]\nroute_prefix = \"/api/proxy\"\n").unwrap();
    assert_eq!(config.request_object.route_prefix, "/api/proxy");
    let invoker = router_invoker(config);

    let reply = invoker
        .invoke(HttpRequestMessage::new("GET", "/api/proxy/status"))
        .unwrap();
    assert_eq!(json_body(reply.body())["path"], "/status");

    let reply = invoker
        .invoke(HttpRequestMessage::new("GET", "/api/AzureWebAdapter/status"))
        .unwrap();
    assert_eq!(json_body(reply.body())["path"], "/api/AzureWebAdapter/status");
}

#[test]
fn test_deny_matches_decoded_path() {
    let (echo, calls) = CountingEcho::new();
    let facade = ProxyBuilder::new(ProxyConfig::default())
        .filter(DenyPathFilter::new("/my pets", StatusCode::FORBIDDEN, "Forbidden"))
        .build(echo)
        .unwrap();
    let facade = Arc::new(LazyFacade::new(move || Ok(facade.clone())));
    let invoker = Invoker::new(RequestObjectAdapter::default(), facade);

    let reply = invoker
        .invoke(HttpRequestMessage::new(
            "GET",
            "https://example.azurewebsites.net/api/AzureWebAdapter/my%20pets",
        ))
        .unwrap();
    assert_eq!(reply.status(), 403);
    assert_eq!(reply.body(), Some(&MessageBody::Text("Forbidden".into())));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_decoded_path_reaches_router_encoded() {
    let invoker = router_invoker(ProxyConfig::default());
    let reply = invoker
        .invoke(HttpRequestMessage::new("GET", "/api/AzureWebAdapter/my%20pets"))
        .unwrap();
    assert_eq!(json_body(reply.body())["path"], "/my%20pets");
}

#[test]
fn test_require_header_rejects_before_dispatch() {
    let config = parse_config(
        r#"
        [[filters]]
        kind = "require_header"
        header = "Authorization"
        "#,
    )
    .unwrap();
    let (echo, calls) = CountingEcho::new();
    let adapter = RequestObjectAdapter::new(&config.request_object);
    let facade = ProxyBuilder::new(config).build(echo).unwrap();
    let facade = Arc::new(LazyFacade::new(move || Ok(facade.clone())));
    let invoker = Invoker::new(adapter, facade);

    let reply = invoker
        .invoke(HttpRequestMessage::new("GET", "/api/AzureWebAdapter/secret"))
        .unwrap();
    assert_eq!(reply.status(), 401);
    assert_eq!(
        reply.body(),
        Some(&MessageBody::Text("Missing Authorization header".into()))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let reply = invoker
        .invoke(
            HttpRequestMessage::new("GET", "/api/AzureWebAdapter/secret?x=1")
                .header("Authorization", "Bearer t"),
        )
        .unwrap();
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.body(), Some(&MessageBody::Text("x=1\n".into())));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
