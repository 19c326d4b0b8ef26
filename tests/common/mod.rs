//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::Query,
    http::{HeaderMap, Method, Uri},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use serverless_proxy::error::DispatchError;
use serverless_proxy::{
    dispatcher_fn, filter_fn, CanonicalRequest, CanonicalResponse, Dispatcher, Filter,
};

/// Terminal dispatcher that counts its calls and echoes every query value, one per line.
pub struct CountingEcho {
    calls: Arc<AtomicUsize>,
}

impl CountingEcho {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl Dispatcher for CountingEcho {
    fn handle(
        &self,
        req: &CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<(), DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        resp.set_content_type("text/plain; charset=UTF-8")?;
        for (name, value) in req.query().pairs() {
            resp.write_str(&format!("{name}={value}\n"))?;
        }
        Ok(())
    }
}

/// Dispatcher that always fails.
pub fn failing_dispatcher() -> impl Dispatcher {
    dispatcher_fn(|_req, _resp| Err(DispatchError::engine("backend unavailable")))
}

/// Filter that appends its name to `log` and continues.
pub fn recording_filter(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> impl Filter {
    filter_fn(name, move |req, resp, next| {
        log.lock().unwrap().push(name.to_string());
        next.run(req, resp)
    })
}

/// A small axum application used as the dispatch engine.
pub fn echo_router() -> Router {
    Router::new()
        .route(
            "/pets",
            get(|Query(pairs): Query<Vec<(String, String)>>| async move {
                Json(json!({ "query": pairs }))
            }),
        )
        .fallback(
            |method: Method, uri: Uri, headers: HeaderMap, body: String| async move {
                let names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();
                Json(json!({
                    "method": method.as_str(),
                    "path": uri.path(),
                    "query": uri.query(),
                    "headers": names,
                    "body": body,
                }))
            },
        )
}

/// Minimal API-gateway event.
pub fn gateway_event(method: &str, path: &str) -> Value {
    json!({
        "httpMethod": method,
        "path": path,
        "headers": {},
        "multiValueHeaders": {},
        "queryStringParameters": null,
        "multiValueQueryStringParameters": null,
        "body": null,
        "isBase64Encoded": false
    })
}
