//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the serverless proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Dispatch settings shared by every platform.
    pub dispatch: DispatchConfig,

    /// API-gateway proxy event adapter.
    pub api_gateway: ApiGatewayConfig,

    /// Platform-native request-object adapter.
    pub request_object: RequestObjectConfig,

    /// Ordered filter declarations (registration order = execution order).
    pub filters: Vec<FilterConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Character encoding of fresh responses (UTF-8, US-ASCII, ISO-8859-1).
    pub default_charset: String,

    /// Maximum buffered response body from the embedded router, in bytes.
    pub max_body_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_charset: "UTF-8".to_string(),
            max_body_size: 6 * 1024 * 1024, // 6MB, the synchronous Lambda payload cap
        }
    }
}

/// How multiple values of one header collapse into a single-value slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMergePolicy {
    /// Join values with ", ".
    #[default]
    CommaJoin,
    /// Keep the first value.
    FirstWins,
    /// Keep the last value.
    LastWins,
}

impl HeaderMergePolicy {
    /// Collapse `values`; `None` when there are none.
    pub fn merge(self, values: &[String]) -> Option<String> {
        match self {
            HeaderMergePolicy::CommaJoin => (!values.is_empty()).then(|| values.join(", ")),
            HeaderMergePolicy::FirstWins => values.first().cloned(),
            HeaderMergePolicy::LastWins => values.last().cloned(),
        }
    }
}

/// API-gateway adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApiGatewayConfig {
    /// Policy for the single-value `headers` reply map (`multiValueHeaders` keeps all).
    pub header_policy: HeaderMergePolicy,
}

/// Request-object adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestObjectConfig {
    /// Route prefix stripped from the request path (exact, segment-aligned).
    pub route_prefix: String,
}

impl Default for RequestObjectConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/api/AzureWebAdapter".to_string(),
        }
    }
}

/// A declarative filter entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    /// Reject requests to an exact path.
    DenyPath {
        path: String,
        #[serde(default = "default_deny_status")]
        status: u16,
        #[serde(default = "default_deny_message")]
        message: String,
    },

    /// Reject requests missing a header.
    RequireHeader {
        header: String,
        #[serde(default = "default_unauthorized_status")]
        status: u16,
    },

    /// Add a fixed header to responses.
    ResponseHeader { name: String, value: String },

    /// Propagate a correlation ID header.
    RequestId {
        #[serde(default = "default_request_id_header")]
        header: String,
    },
}

impl FilterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            FilterConfig::DenyPath { .. } => "deny_path",
            FilterConfig::RequireHeader { .. } => "require_header",
            FilterConfig::ResponseHeader { .. } => "response_header",
            FilterConfig::RequestId { .. } => "request_id",
        }
    }
}

fn default_deny_status() -> u16 {
    403
}

fn default_deny_message() -> String {
    "Forbidden".to_string()
}

fn default_unauthorized_status() -> u16 {
    401
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Record invocation metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}
