//! Platform adapters.
//!
//! # Data Flow
//! ```text
//! native event ──decode──▶ CanonicalRequest
//! SealedResponse ──encode──▶ native reply
//! ```
//!
//! # Design Decisions
//! - Adapters are pure and stateless apart from their configuration
//! - Missing method or path is a hard decode failure, never guessed
//! - Every native header/query value survives decoding, in order, undeduplicated
//! - Single-value reply slots collapse through a documented [`HeaderMergePolicy`]
//!
//! [`HeaderMergePolicy`]: crate::config::HeaderMergePolicy

pub mod api_gateway;
pub mod request_object;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::error::AdapterError;
use crate::model::charset::{is_textual, media_type};
use crate::model::{CanonicalRequest, SealedResponse};

pub use api_gateway::{ApiGatewayAdapter, ApiGatewayProxyEvent, ApiGatewayProxyResponse};
pub use request_object::{
    HttpRequestMessage, HttpResponseMessage, HttpResponseMessageBuilder, MessageBody,
    RequestObjectAdapter,
};

/// Translation between one platform's native shapes and the canonical model.
pub trait PlatformAdapter: Send + Sync {
    type Event;
    type Reply;

    /// Short platform label for logs and metrics.
    const PLATFORM: &'static str;

    fn decode(&self, event: Self::Event) -> Result<CanonicalRequest, AdapterError>;

    fn encode(&self, response: SealedResponse) -> Result<Self::Reply, AdapterError>;
}

/// Invocation ID supplied by the platform when it is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRequestId(pub String);

/// Parse a native method name. Names are ASCII-uppercased before parsing.
pub(crate) fn parse_method(raw: Option<&str>, field: &'static str) -> Result<Method, AdapterError> {
    let raw = raw
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(AdapterError::MissingField(field))?;
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| AdapterError::InvalidMethod(raw.to_string()))
}

/// Append one native header to `headers`, rejecting names or values HTTP cannot carry.
pub(crate) fn append_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
) -> Result<(), AdapterError> {
    let invalid = |source: axum::http::Error| AdapterError::InvalidHeader {
        name: name.to_string(),
        source,
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.into()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.into()))?;
    headers.append(header_name, header_value);
    Ok(())
}

/// Whether a sealed body can travel as plain text: it must decode under the declared
/// charset and its content type (if any) must be textual.
pub(crate) fn text_body(response: &SealedResponse) -> Option<String> {
    if response.body().is_empty() {
        return Some(String::new());
    }
    let textual = response
        .content_type()
        .map(|ct| is_textual(&media_type(ct)))
        .unwrap_or(true);
    if textual {
        response.body_text()
    } else {
        None
    }
}
