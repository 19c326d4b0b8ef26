//! Canonical request.
//!
//! # Responsibilities
//! - Carry method, normalized path, headers, query parameters and body of one invocation
//! - Derive and cache the content type at build time
//! - Offer a typed extension bag so filters can hand context downstream
//!
//! # Design Decisions
//! - Built once by a platform adapter through [`CanonicalRequestBuilder`]
//! - No mutators for the HTTP fields; only extensions change during the chain
//! - Request ID generated at build time unless the platform supplies one

use axum::http::{header, Extensions, HeaderMap, HeaderName, HeaderValue, Method};
use bytes::Bytes;
use uuid::Uuid;

use crate::model::charset::charset_param;
use crate::model::headers;
use crate::model::query::QueryParams;

/// Request ID header propagated to the dispatch engine.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug)]
pub struct CanonicalRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: QueryParams,
    body: Bytes,
    content_type: Option<String>,
    request_id: Uuid,
    extensions: Extensions,
}

impl CanonicalRequest {
    pub fn builder(method: Method, path: impl Into<String>) -> CanonicalRequestBuilder {
        CanonicalRequestBuilder::new(method, path)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        headers::first(&self.headers, name)
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        headers::all(&self.headers, name)
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// First value of a query parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.query.get(name)
    }

    pub fn parameter_values(&self, name: &str) -> Vec<&str> {
        self.query.get_all(name)
    }

    /// Query string rebuilt from the parameter list, without the leading `?`.
    pub fn query_string(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.query.pairs() {
            serializer.append_pair(name, value);
        }
        Some(serializer.finish())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The `charset` parameter of the content type.
    pub fn character_encoding(&self) -> Option<&str> {
        self.content_type.as_deref().and_then(charset_param)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Builder used by platform adapters (and tests) to assemble a request.
#[derive(Debug)]
pub struct CanonicalRequestBuilder {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: QueryParams,
    body: Bytes,
    request_id: Option<Uuid>,
    extensions: Extensions,
}

impl CanonicalRequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: QueryParams::new(),
            body: Bytes::new(),
            request_id: None,
            extensions: Extensions::new(),
        }
    }

    /// Append a header value; existing values are kept.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    pub fn build(self) -> CanonicalRequest {
        let path = if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path
        };
        let content_type = headers::first(&self.headers, header::CONTENT_TYPE).map(str::to_string);

        CanonicalRequest {
            method: self.method,
            path,
            headers: self.headers,
            query: self.query,
            body: self.body,
            content_type,
            request_id: self.request_id.unwrap_or_else(Uuid::new_v4),
            extensions: self.extensions,
        }
    }
}
