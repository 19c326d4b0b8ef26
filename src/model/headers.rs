//! Header value access shared by the request and response.

use axum::http::{header::AsHeaderName, HeaderMap, HeaderValue};

/// A header value as text. Values that are not valid UTF-8 have no text form.
pub fn value_str(value: &HeaderValue) -> Option<&str> {
    std::str::from_utf8(value.as_bytes()).ok()
}

/// First value of `name`.
pub fn first<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(value_str)
}

/// Every value of `name` in insertion order.
pub fn all<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Vec<&str> {
    headers.get_all(name).iter().filter_map(value_str).collect()
}
