//! API-gateway proxy event adapter.
//!
//! # Responsibilities
//! - Decode the proxy event JSON into a canonical request
//! - Encode a sealed response into the proxy reply JSON
//!
//! # Design Decisions
//! - Multi-value maps are authoritative; single-value entries only fill keys they lack
//! - Event maps keep the key order they arrived in
//! - A null or absent `isBase64Encoded` means a plain-text body
//! - `isBase64Encoded` bodies are decoded to raw bytes before dispatch
//! - Reply bodies travel as text when textual and decodable, base64 otherwise
//! - `multiValueHeaders` carries every value; `headers` collapses per the merge policy

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{ApiGatewayConfig, HeaderMergePolicy};
use crate::error::AdapterError;
use crate::model::{CanonicalRequest, QueryParams, SealedResponse};
use crate::platform::{append_header, parse_method, text_body, PlatformAdapter, PlatformRequestId};

/// Inbound proxy event. Null and absent maps are treated alike.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyEvent {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub multi_value_headers: Option<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub query_string_parameters: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
    #[serde(default)]
    pub request_context: Option<ApiGatewayRequestContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayRequestContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
}

/// Outbound proxy reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,
    pub multi_value_headers: IndexMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ApiGatewayAdapter {
    header_policy: HeaderMergePolicy,
}

impl ApiGatewayAdapter {
    pub fn new(config: &ApiGatewayConfig) -> Self {
        Self {
            header_policy: config.header_policy,
        }
    }

    pub fn with_header_policy(mut self, policy: HeaderMergePolicy) -> Self {
        self.header_policy = policy;
        self
    }

    /// Decode raw event JSON.
    pub fn decode_slice(&self, input: &[u8]) -> Result<CanonicalRequest, AdapterError> {
        let event: ApiGatewayProxyEvent = serde_json::from_slice(input)?;
        self.decode(event)
    }

    /// Encode to raw reply JSON.
    pub fn encode_vec(&self, response: SealedResponse) -> Result<Vec<u8>, AdapterError> {
        let reply = self.encode(response)?;
        Ok(serde_json::to_vec(&reply)?)
    }
}

/// Multi-value headers first, then single-value headers for names not yet present.
fn merge_headers(
    multi: Option<IndexMap<String, Vec<String>>>,
    single: Option<IndexMap<String, String>>,
) -> Result<HeaderMap, AdapterError> {
    let mut headers = HeaderMap::new();
    for (name, values) in multi.into_iter().flatten() {
        for value in &values {
            append_header(&mut headers, &name, value)?;
        }
    }
    for (name, value) in single.into_iter().flatten() {
        if !headers.contains_key(name.as_str()) {
            append_header(&mut headers, &name, &value)?;
        }
    }
    Ok(headers)
}

/// Same rule as [`merge_headers`], with exact name matching.
fn merge_query(
    multi: Option<IndexMap<String, Vec<String>>>,
    single: Option<IndexMap<String, String>>,
) -> QueryParams {
    let mut query = QueryParams::new();
    for (name, values) in multi.into_iter().flatten() {
        for value in values {
            query.append(name.as_str(), value);
        }
    }
    for (name, value) in single.into_iter().flatten() {
        if !query.contains_key(&name) {
            query.append(name, value);
        }
    }
    query
}

impl PlatformAdapter for ApiGatewayAdapter {
    type Event = ApiGatewayProxyEvent;
    type Reply = ApiGatewayProxyResponse;

    const PLATFORM: &'static str = "api_gateway";

    fn decode(&self, event: ApiGatewayProxyEvent) -> Result<CanonicalRequest, AdapterError> {
        let method = parse_method(event.http_method.as_deref(), "httpMethod")?;
        let path = event
            .path
            .filter(|p| !p.is_empty())
            .ok_or(AdapterError::MissingField("path"))?;

        let headers = merge_headers(event.multi_value_headers, event.headers)?;
        let query = merge_query(
            event.multi_value_query_string_parameters,
            event.query_string_parameters,
        );

        let body = match event.body {
            Some(body) if event.is_base64_encoded.unwrap_or(false) => {
                Bytes::from(STANDARD.decode(body)?)
            }
            Some(body) => Bytes::from(body),
            None => Bytes::new(),
        };

        let mut builder = CanonicalRequest::builder(method, path)
            .headers(headers)
            .query(query)
            .body(body);

        if let Some(id) = event.request_context.and_then(|ctx| ctx.request_id) {
            match uuid::Uuid::parse_str(&id) {
                Ok(uuid) => builder = builder.request_id(uuid),
                Err(_) => builder = builder.extension(PlatformRequestId(id)),
            }
        }

        let request = builder.build();
        tracing::debug!(
            request_id = %request.request_id(),
            method = %request.method(),
            path = request.path(),
            body_len = request.content_length(),
            "Decoded API gateway event"
        );
        Ok(request)
    }

    fn encode(&self, response: SealedResponse) -> Result<ApiGatewayProxyResponse, AdapterError> {
        let mut headers = IndexMap::new();
        let mut multi_value_headers = IndexMap::new();
        for name in response.headers().keys() {
            let values: Vec<String> = response
                .headers()
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            if let Some(merged) = self.header_policy.merge(&values) {
                headers.insert(name.as_str().to_string(), merged);
            }
            multi_value_headers.insert(name.as_str().to_string(), values);
        }

        let (body, is_base64_encoded) = match text_body(&response) {
            Some(text) => (text, false),
            None => (STANDARD.encode(response.body()), true),
        };

        Ok(ApiGatewayProxyResponse {
            status_code: response.status().as_u16(),
            headers,
            multi_value_headers,
            body,
            is_base64_encoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalResponse;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<CanonicalRequest, AdapterError> {
        ApiGatewayAdapter::default().decode_slice(value.to_string().as_bytes())
    }

    #[test]
    fn test_decode_preserves_every_query_value() {
        let req = decode(json!({
            "httpMethod": "GET",
            "path": "/pets",
            "queryStringParameters": {"foo": "baz"},
            "multiValueQueryStringParameters": {"foo": ["bar", "baz"]},
            "headers": {"Accept": "application/json"},
            "multiValueHeaders": null,
            "body": null,
            "isBase64Encoded": false
        }))
        .unwrap();

        assert_eq!(*req.method(), Method::GET);
        assert_eq!(req.path(), "/pets");
        assert_eq!(req.parameter_values("foo"), ["bar", "baz"]);
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_single_value_fills_missing_keys_only() {
        let req = decode(json!({
            "httpMethod": "POST",
            "path": "/",
            "headers": {"X-A": "single", "X-B": "only"},
            "multiValueHeaders": {"x-a": ["one", "two"]}
        }))
        .unwrap();

        assert_eq!(req.header_values("X-A"), ["one", "two"]);
        assert_eq!(req.header_values("x-b"), ["only"]);
    }

    #[test]
    fn test_event_key_order_preserved() {
        let req = ApiGatewayAdapter::default()
            .decode_slice(
                br#"{
                    "httpMethod": "GET",
                    "path": "/",
                    "multiValueHeaders": {"x-tag": ["1"], "X-TAG": ["2"], "Accept": ["*/*"]},
                    "headers": {"Zulu": "z", "Alpha": "a"},
                    "multiValueQueryStringParameters": {"zeta": ["1"], "alpha": ["2"]},
                    "queryStringParameters": {"mid": "3"}
                }"#,
            )
            .unwrap();

        assert_eq!(req.header_values("x-tag"), ["1", "2"]);
        let names: Vec<&str> = req.headers().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["x-tag", "accept", "zulu", "alpha"]);
        assert_eq!(req.query_string().as_deref(), Some("zeta=1&alpha=2&mid=3"));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let err = decode(json!({
            "httpMethod": "GET",
            "path": "/",
            "headers": {"bad header": "x"}
        }))
        .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidHeader { .. }));
    }

    #[test]
    fn test_base64_body_decoded() {
        let req = decode(json!({
            "httpMethod": "PUT",
            "path": "/upload",
            "body": STANDARD.encode([0u8, 159, 146, 150]),
            "isBase64Encoded": true
        }))
        .unwrap();
        assert_eq!(req.body().as_ref(), &[0u8, 159, 146, 150]);

        let err = decode(json!({
            "httpMethod": "PUT",
            "path": "/upload",
            "body": "not base64!",
            "isBase64Encoded": true
        }))
        .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidBody(_)));
    }

    #[test]
    fn test_null_base64_flag_means_text() {
        let req = decode(json!({
            "httpMethod": "POST",
            "path": "/notes",
            "body": "aGVsbG8=",
            "isBase64Encoded": null
        }))
        .unwrap();
        assert_eq!(req.body_text(), "aGVsbG8=");
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(matches!(
            decode(json!({"path": "/pets"})),
            Err(AdapterError::MissingField("httpMethod"))
        ));
        assert!(matches!(
            decode(json!({"httpMethod": "GET"})),
            Err(AdapterError::MissingField("path"))
        ));
        assert!(matches!(
            ApiGatewayAdapter::default().decode_slice(b"{not json"),
            Err(AdapterError::Json(_))
        ));
    }

    #[test]
    fn test_request_context_id() {
        let req = decode(json!({
            "httpMethod": "GET",
            "path": "/",
            "requestContext": {"requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef"}
        }))
        .unwrap();
        assert_eq!(
            req.request_id().to_string(),
            "c6af9ac6-7b61-11e6-9a41-93e8deadbeef"
        );

        let req = decode(json!({
            "httpMethod": "GET",
            "path": "/",
            "requestContext": {"requestId": "abc-123", "stage": "prod"}
        }))
        .unwrap();
        assert_eq!(
            req.extensions().get::<PlatformRequestId>(),
            Some(&PlatformRequestId("abc-123".into()))
        );
    }

    #[test]
    fn test_encode_text_reply() {
        let mut resp = CanonicalResponse::new();
        resp.set_status(StatusCode::CREATED);
        resp.set_content_type("application/json").unwrap();
        resp.add_header("Set-Cookie", "a=1").unwrap();
        resp.add_header("Set-Cookie", "b=2").unwrap();
        resp.write(br#"{"ok":true}"#);

        let reply = ApiGatewayAdapter::default().encode(resp.seal()).unwrap();
        assert_eq!(reply.status_code, 201);
        assert!(!reply.is_base64_encoded);
        assert_eq!(reply.body, r#"{"ok":true}"#);
        assert_eq!(reply.multi_value_headers["set-cookie"], vec!["a=1", "b=2"]);
        assert_eq!(reply.headers["set-cookie"], "a=1, b=2");
        assert_eq!(reply.headers["content-type"], "application/json");
    }

    #[test]
    fn test_encode_binary_reply_and_policy() {
        let mut resp = CanonicalResponse::new();
        resp.set_content_type("application/octet-stream").unwrap();
        resp.add_header("X-V", "1").unwrap();
        resp.add_header("X-V", "2").unwrap();
        resp.write(&[0xde, 0xad, 0xbe, 0xef]);

        let adapter = ApiGatewayAdapter::default().with_header_policy(HeaderMergePolicy::LastWins);
        let reply = adapter.encode(resp.seal()).unwrap();
        assert_eq!(reply.status_code, 200);
        assert!(reply.is_base64_encoded);
        assert_eq!(STANDARD.decode(&reply.body).unwrap(), [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(reply.headers["x-v"], "2");
    }

    #[test]
    fn test_reply_json_field_names() {
        let bytes = ApiGatewayAdapter::default()
            .encode_vec(CanonicalResponse::new().seal())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["body"], "");
        assert!(value["multiValueHeaders"].is_object());
    }
}
