//! Platform-native request-object adapter.
//!
//! # Responsibilities
//! - Decode a request message (method, absolute or relative URI, header and query maps)
//! - Strip the function's route prefix so the application sees its own paths
//! - Build the native reply through [`HttpResponseMessageBuilder`]
//!
//! # Design Decisions
//! - The URI path is percent-decoded before the prefix is stripped
//! - Prefix stripping is exact and segment-aligned: `/api/AzureWebAdapterX` is left alone
//! - The explicit query map wins when non-empty; otherwise the URI's own pairs are used
//! - Header values are taken verbatim, commas are never split
//! - Each header value becomes its own builder call, so repeated headers survive

use axum::http::{HeaderMap, StatusCode};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::RequestObjectConfig;
use crate::error::AdapterError;
use crate::model::{CanonicalRequest, QueryParams, SealedResponse};
use crate::platform::{append_header, parse_method, text_body, PlatformAdapter};

/// Inbound request message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestMessage {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub query_parameters: IndexMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl HttpRequestMessage {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Reply body: text when the response is textual and decodable, raw bytes otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Text(String),
    Binary(Vec<u8>),
}

/// Outbound reply message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponseMessage {
    status: u16,
    headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<MessageBody>,
}

impl HttpResponseMessage {
    pub fn builder() -> HttpResponseMessageBuilder {
        HttpResponseMessageBuilder::default()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Every header call, in order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header (case-insensitive).
    pub fn header<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.header_values(name).next()
    }

    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&MessageBody> {
        self.body.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponseMessageBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Option<MessageBody>,
}

impl Default for HttpResponseMessageBuilder {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl HttpResponseMessageBuilder {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add one header value; repeated calls with the same name accumulate.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: MessageBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> HttpResponseMessage {
        HttpResponseMessage {
            status: self.status.as_u16(),
            headers: self.headers,
            body: self.body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestObjectAdapter {
    route_prefix: String,
}

impl Default for RequestObjectAdapter {
    fn default() -> Self {
        Self::new(&RequestObjectConfig::default())
    }
}

impl RequestObjectAdapter {
    pub fn new(config: &RequestObjectConfig) -> Self {
        Self {
            route_prefix: config.route_prefix.clone(),
        }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// Remove the route prefix when it matches whole leading segments.
    fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        if self.route_prefix.is_empty() {
            return path;
        }
        match path.strip_prefix(self.route_prefix.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

fn parse_uri(uri: &str) -> Result<Url, AdapterError> {
    let invalid = |source| AdapterError::InvalidUri {
        uri: uri.to_string(),
        source,
    };
    match Url::parse(uri) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
            .and_then(|base| base.join(uri))
            .map_err(invalid),
        Err(e) => Err(invalid(e)),
    }
}

impl PlatformAdapter for RequestObjectAdapter {
    type Event = HttpRequestMessage;
    type Reply = HttpResponseMessage;

    const PLATFORM: &'static str = "request_object";

    fn decode(&self, message: HttpRequestMessage) -> Result<CanonicalRequest, AdapterError> {
        let method = parse_method(message.method.as_deref(), "method")?;
        let raw_uri = message
            .uri
            .filter(|u| !u.is_empty())
            .ok_or(AdapterError::MissingField("uri"))?;
        let url = parse_uri(&raw_uri)?;
        let decoded = percent_decode_str(url.path()).decode_utf8_lossy();
        let path = self.strip_prefix(&decoded);

        let mut headers = HeaderMap::new();
        for (name, value) in &message.headers {
            append_header(&mut headers, name, value)?;
        }

        let query: QueryParams = if message.query_parameters.is_empty() {
            url.query_pairs().collect()
        } else {
            message.query_parameters.into_iter().collect()
        };

        let request = CanonicalRequest::builder(method, path)
            .headers(headers)
            .query(query)
            .body(message.body.unwrap_or_default())
            .build();

        tracing::debug!(
            request_id = %request.request_id(),
            method = %request.method(),
            uri = %raw_uri,
            path = request.path(),
            "Decoded request message"
        );
        Ok(request)
    }

    fn encode(&self, response: SealedResponse) -> Result<HttpResponseMessage, AdapterError> {
        let mut builder = HttpResponseMessage::builder().status(response.status());
        for (name, value) in response.headers() {
            builder = builder.header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        if !response.body().is_empty() {
            let body = match text_body(&response) {
                Some(text) => MessageBody::Text(text),
                None => MessageBody::Binary(response.body().to_vec()),
            };
            builder = builder.body(body);
        }
        Ok(builder.build())
    }
}
