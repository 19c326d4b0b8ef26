//! Filters that can be declared in configuration.
//!
//! # Design Decisions
//! - Rejections write status and a short plain-text body, then stop the chain
//! - Path matching is exact (no prefixes, no patterns)
//! - Header names and values are parsed once, when the filter is built

use axum::http::{HeaderName, HeaderValue, StatusCode};
use uuid::Uuid;

use crate::chain::filter::{Filter, Next};
use crate::error::DispatchError;
use crate::model::{CanonicalRequest, CanonicalResponse, X_REQUEST_ID};

fn reject(resp: &mut CanonicalResponse, status: StatusCode, message: &str) -> Result<(), DispatchError> {
    resp.send_error(status, Some(message))?;
    resp.set_content_type("text/plain; charset=UTF-8")?;
    resp.write_str(message)
}

/// Rejects requests whose path equals `path`.
#[derive(Debug, Clone)]
pub struct DenyPathFilter {
    path: String,
    status: StatusCode,
    message: String,
}

impl DenyPathFilter {
    pub fn new(path: impl Into<String>, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status,
            message: message.into(),
        }
    }
}

impl Filter for DenyPathFilter {
    fn name(&self) -> &str {
        "deny_path"
    }

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        next: Next<'_>,
    ) -> Result<(), DispatchError> {
        if req.path() == self.path {
            tracing::warn!(
                request_id = %req.request_id(),
                path = %req.path(),
                status = self.status.as_u16(),
                "Request denied"
            );
            return reject(resp, self.status, &self.message);
        }
        next.run(req, resp)
    }
}

/// Rejects requests that do not carry a header.
#[derive(Debug, Clone)]
pub struct RequireHeaderFilter {
    header: String,
    status: StatusCode,
}

impl RequireHeaderFilter {
    pub fn new(header: impl Into<String>, status: StatusCode) -> Self {
        Self {
            header: header.into(),
            status,
        }
    }
}

impl Filter for RequireHeaderFilter {
    fn name(&self) -> &str {
        "require_header"
    }

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        next: Next<'_>,
    ) -> Result<(), DispatchError> {
        match req.header(&self.header) {
            Some(value) if !value.trim().is_empty() => next.run(req, resp),
            _ => {
                tracing::warn!(
                    request_id = %req.request_id(),
                    header = %self.header,
                    "Required header missing"
                );
                reject(resp, self.status, &format!("Missing {} header", self.header))
            }
        }
    }
}

/// Adds a fixed header to every response that passes through.
#[derive(Debug, Clone)]
pub struct ResponseHeaderFilter {
    name: HeaderName,
    value: HeaderValue,
}

impl ResponseHeaderFilter {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Filter for ResponseHeaderFilter {
    fn name(&self) -> &str {
        "response_header"
    }

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        next: Next<'_>,
    ) -> Result<(), DispatchError> {
        resp.add_header(self.name.clone(), self.value.clone())?;
        next.run(req, resp)
    }
}

/// Correlation ID attached to the request extensions by [`RequestIdFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Propagates a correlation ID: reuses the incoming header value when present,
/// otherwise the invocation's generated ID, and echoes it on the response.
#[derive(Debug, Clone)]
pub struct RequestIdFilter {
    header: HeaderName,
}

impl RequestIdFilter {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl Default for RequestIdFilter {
    fn default() -> Self {
        Self::new(HeaderName::from_static(X_REQUEST_ID))
    }
}

impl Filter for RequestIdFilter {
    fn name(&self) -> &str {
        "request_id"
    }

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        next: Next<'_>,
    ) -> Result<(), DispatchError> {
        let id = req
            .header(self.header.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| req.request_id().to_string());

        req.extensions_mut().insert(RequestId(id.clone()));
        resp.set_header(self.header.clone(), id.as_str())?;
        next.run(req, resp)
    }
}

/// Parse a correlation ID as a UUID, if it is one.
pub fn parse_request_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FilterChain;
    use crate::dispatch::dispatcher_fn;
    use axum::http::{header, Method};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn run(
        filters: Vec<Arc<dyn Filter>>,
        mut req: CanonicalRequest,
    ) -> (CanonicalResponse, usize, CanonicalRequest) {
        let calls = AtomicUsize::new(0);
        let dispatcher = dispatcher_fn(|_req, resp| {
            calls.fetch_add(1, Ordering::SeqCst);
            resp.write_str("dispatched")
        });
        let mut resp = CanonicalResponse::new();
        FilterChain::new(&filters, &dispatcher)
            .run(&mut req, &mut resp)
            .unwrap();
        let calls = calls.load(Ordering::SeqCst);
        (resp, calls, req)
    }

    #[test]
    fn test_deny_path_exact_match() {
        let deny: Arc<dyn Filter> =
            Arc::new(DenyPathFilter::new("/foo/deny", StatusCode::FORBIDDEN, "Forbidden"));

        let req = CanonicalRequest::builder(Method::GET, "/foo/deny").build();
        let (resp, calls, _) = run(vec![deny.clone()], req);
        assert_eq!(calls, 0);
        assert_eq!(resp.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(resp.body_text().as_deref(), Some("Forbidden"));

        let req = CanonicalRequest::builder(Method::GET, "/foo/deny/more").build();
        let (_, calls, _) = run(vec![deny], req);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_require_header() {
        let filter: Arc<dyn Filter> =
            Arc::new(RequireHeaderFilter::new("Authorization", StatusCode::UNAUTHORIZED));

        let req = CanonicalRequest::builder(Method::GET, "/").build();
        let (resp, calls, _) = run(vec![filter.clone()], req);
        assert_eq!(calls, 0);
        assert_eq!(resp.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(resp.error_message(), Some("Missing Authorization header"));

        let req = CanonicalRequest::builder(Method::GET, "/")
            .header(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"))
            .build();
        let (_, calls, _) = run(vec![filter], req);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_request_id_reuses_incoming_header() {
        let filters: Vec<Arc<dyn Filter>> = vec![Arc::new(RequestIdFilter::default())];
        let req = CanonicalRequest::builder(Method::GET, "/")
            .header(
                HeaderName::from_static(X_REQUEST_ID),
                HeaderValue::from_static("abc-123"),
            )
            .build();

        let (resp, _, req) = run(filters, req);
        assert_eq!(resp.header("x-request-id"), Some("abc-123"));
        assert_eq!(
            req.extensions().get::<RequestId>().map(RequestId::as_str),
            Some("abc-123")
        );
    }

    #[test]
    fn test_request_id_falls_back_to_generated() {
        let filters: Vec<Arc<dyn Filter>> = vec![
            Arc::new(RequestIdFilter::default()),
            Arc::new(ResponseHeaderFilter::new(
                header::SERVER,
                HeaderValue::from_static("serverless-proxy"),
            )),
        ];
        let req = CanonicalRequest::builder(Method::GET, "/").build();
        let generated = req.request_id();

        let (resp, _, _) = run(filters, req);
        let echoed = resp.header("x-request-id").and_then(parse_request_id);
        assert_eq!(echoed, Some(generated));
        assert_eq!(resp.header("server"), Some("serverless-proxy"));
    }
}
