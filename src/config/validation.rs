//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (status codes, body limits)
//! - Check charset names and the route prefix shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use tracing_subscriber::filter::LevelFilter;

use crate::config::schema::{FilterConfig, ProxyConfig};
use crate::model::Charset;

/// A single semantic problem, located by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if Charset::from_label(&config.dispatch.default_charset).is_err() {
        errors.push(ValidationError::new(
            "dispatch.default_charset",
            format!("unsupported charset `{}`", config.dispatch.default_charset),
        ));
    }
    if config.dispatch.max_body_size == 0 {
        errors.push(ValidationError::new(
            "dispatch.max_body_size",
            "must be greater than zero",
        ));
    }

    let prefix = &config.request_object.route_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::new(
            "request_object.route_prefix",
            "must start with '/' and must not end with '/'",
        ));
    }

    for (i, filter) in config.filters.iter().enumerate() {
        let field = |name: &str| format!("filters[{i}].{name}");
        match filter {
            FilterConfig::DenyPath { path, status, .. } => {
                if !path.starts_with('/') {
                    errors.push(ValidationError::new(field("path"), "must start with '/'"));
                }
                check_status(&mut errors, field("status"), *status);
            }
            FilterConfig::RequireHeader { header, status } => {
                check_header_name(&mut errors, field("header"), header);
                check_status(&mut errors, field("status"), *status);
            }
            FilterConfig::ResponseHeader { name, value } => {
                check_header_name(&mut errors, field("name"), name);
                if HeaderValue::from_str(value).is_err() {
                    errors.push(ValidationError::new(
                        field("value"),
                        "contains characters not allowed in a header value",
                    ));
                }
            }
            FilterConfig::RequestId { header } => {
                check_header_name(&mut errors, field("header"), header);
            }
        }
    }

    if config.observability.log_level.parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_header_name(errors: &mut Vec<ValidationError>, field: String, name: &str) {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            field,
            format!("`{name}` is not a valid header name"),
        ));
    }
}

fn check_status(errors: &mut Vec<ValidationError>, field: String, status: u16) {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() || code.is_server_error() => {}
        _ => errors.push(ValidationError::new(
            field,
            format!("{status} is not a 4xx/5xx status"),
        )),
    }
}
