//! Error taxonomy.
//!
//! # Layers
//! ```text
//! AdapterError   native event ↔ canonical model translation
//! DispatchError  filter chain, dispatch engine, response writer
//! BuildError     cold-start construction of the facade
//! InvocationError  the single invocation-fatal error handed to the host runtime
//! ```
//!
//! # Design Decisions
//! - A filter short-circuit is control flow, never an error
//! - Nothing here is retried; retries belong to the host platform

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Boxed error returned by user-supplied filters and dispatch engines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure translating between a native platform event and the canonical model.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("native event is missing mandatory field `{0}`")]
    MissingField(&'static str),

    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    #[error("invalid request URI `{uri}`: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header `{name}`: {source}")]
    InvalidHeader {
        name: String,
        #[source]
        source: axum::http::Error,
    },

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] base64::DecodeError),

    #[error("malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure raised while driving the filter chain or writing the response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("filter chain has already been run")]
    ChainAlreadyRun,

    #[error("filter `{name}` failed: {source}")]
    Filter {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("dispatch engine failed: {0}")]
    Engine(#[source] BoxError),

    #[error("cannot {0}: response is already committed")]
    ResponseCommitted(&'static str),

    #[error("invalid response header: {0}")]
    InvalidHeader(#[source] axum::http::Error),

    #[error("unsupported character encoding `{0}`")]
    UnsupportedCharset(String),

    #[error("character {ch:?} cannot be encoded as {charset}")]
    Unencodable { ch: char, charset: &'static str },
}

impl DispatchError {
    /// Wrap an arbitrary error raised by a named filter.
    pub fn filter(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DispatchError::Filter {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Wrap an arbitrary error raised by the dispatch engine.
    pub fn engine(source: impl Into<BoxError>) -> Self {
        DispatchError::Engine(source.into())
    }
}

/// Failure constructing the dispatch facade at cold start.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid filter `{kind}`: {reason}")]
    Filter { kind: String, reason: String },

    #[error("dispatch engine could not be built: {0}")]
    Engine(#[source] BoxError),
}

/// The invocation-fatal error reported to the host runtime.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to decode platform event: {0}")]
    Decode(#[source] AdapterError),

    #[error("failed to initialize proxy: {0}")]
    Init(#[from] BuildError),

    #[error("request dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("failed to encode platform reply: {0}")]
    Encode(#[source] AdapterError),
}

impl InvocationError {
    /// Status a platform that distinguishes failures should report.
    pub fn status(&self) -> StatusCode {
        match self {
            InvocationError::Decode(_) => StatusCode::BAD_REQUEST,
            InvocationError::Init(_) => StatusCode::SERVICE_UNAVAILABLE,
            InvocationError::Dispatch(_) | InvocationError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
