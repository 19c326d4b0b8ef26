//! Canonical request/response model.
//!
//! # Data Flow
//! ```text
//! platform adapter
//!     → CanonicalRequestBuilder → CanonicalRequest (read-only HTTP fields)
//!     → filter chain + dispatch engine write into CanonicalResponse
//!     → CanonicalResponse::seal() → SealedResponse (immutable)
//!     → platform adapter encodes native reply
//! ```
//!
//! # Design Decisions
//! - Plain owned values scoped to one invocation; nothing retains them afterwards
//! - Headers live in an `http::HeaderMap`; query parameters in an ordered pair list
//! - Multiple values per name always preserved in original order

pub mod charset;
pub mod headers;
pub mod query;
pub mod request;
pub mod response;

pub use charset::Charset;
pub use query::QueryParams;
pub use request::{CanonicalRequest, CanonicalRequestBuilder, X_REQUEST_ID};
pub use response::{CanonicalResponse, SealedResponse};
