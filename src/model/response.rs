//! Canonical response.
//!
//! # Responsibilities
//! - Collect status, headers and body written by filters and the dispatch engine
//! - Encode textual writes with the declared character encoding
//! - Freeze into a [`SealedResponse`] for the platform adapter
//!
//! # Design Decisions
//! - Status stays unset until written; sealing defaults it to 200 (even with an empty body)
//! - Headers live in an `http::HeaderMap`; names are validated when written
//! - `add_header` appends; only the explicit `set_header` replaces
//! - Once committed, status, header and content-type changes are ignored;
//!   error, redirect and reset calls fail
//! - Sealing consumes the response, so no write can follow the read

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use bytes::Bytes;

use crate::error::DispatchError;
use crate::model::charset::{charset_param, Charset};
use crate::model::headers;

#[derive(Debug)]
pub struct CanonicalResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    content_type: Option<String>,
    default_charset: Charset,
    charset: Charset,
    error_message: Option<String>,
    committed: bool,
}

impl Default for CanonicalResponse {
    fn default() -> Self {
        Self::with_charset(Charset::Utf8)
    }
}

impl CanonicalResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh response whose text writes default to `charset`.
    pub fn with_charset(charset: Charset) -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
            content_type: None,
            default_charset: charset,
            charset,
            error_message: None,
            committed: false,
        }
    }

    /// Status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Set the status. Ignored once the response is committed.
    pub fn set_status(&mut self, status: StatusCode) {
        if !self.committed {
            self.status = Some(status);
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        headers::first(&self.headers, name)
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        headers::all(&self.headers, name)
    }

    pub fn contains_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Append a header value; existing values are kept. Ignored once committed.
    pub fn add_header<K, V>(&mut self, name: K, value: V) -> Result<(), DispatchError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<axum::http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<axum::http::Error>,
    {
        let (name, value) = header_pair(name, value)?;
        if !self.committed {
            self.adopt_if_content_type(&name, &value);
            self.headers.append(name, value);
        }
        Ok(())
    }

    /// Replace every value of a header. Ignored once committed.
    pub fn set_header<K, V>(&mut self, name: K, value: V) -> Result<(), DispatchError>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<axum::http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<axum::http::Error>,
    {
        let (name, value) = header_pair(name, value)?;
        if !self.committed {
            self.adopt_if_content_type(&name, &value);
            self.headers.insert(name, value);
        }
        Ok(())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Set the content type; a `charset` parameter becomes the body encoding.
    pub fn set_content_type(&mut self, content_type: &str) -> Result<(), DispatchError> {
        self.set_header(header::CONTENT_TYPE, content_type)
    }

    fn adopt_if_content_type(&mut self, name: &HeaderName, value: &HeaderValue) {
        if *name != header::CONTENT_TYPE {
            return;
        }
        if let Some(value) = headers::value_str(value) {
            self.adopt_content_type(value);
        }
    }

    fn adopt_content_type(&mut self, value: &str) {
        if let Some(charset) = charset_param(value).and_then(|c| Charset::from_label(c).ok()) {
            self.charset = charset;
        }
        self.content_type = Some(value.to_string());
    }

    pub fn character_encoding(&self) -> Charset {
        self.charset
    }

    pub fn set_character_encoding(&mut self, label: &str) -> Result<(), DispatchError> {
        self.charset = Charset::from_label(label)?;
        Ok(())
    }

    /// Append raw bytes to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Append text encoded with the current character encoding.
    pub fn write_str(&mut self, text: &str) -> Result<(), DispatchError> {
        let encoded = self.charset.encode(text)?;
        self.body.extend_from_slice(&encoded);
        Ok(())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded with the current character encoding.
    pub fn body_text(&self) -> Option<String> {
        self.charset.decode(&self.body)
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Mark the response as committed: status and headers are final from here on.
    pub fn commit(&mut self) {
        self.committed = true;
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Record an error status with an optional message.
    pub fn send_error(
        &mut self,
        status: StatusCode,
        message: Option<&str>,
    ) -> Result<(), DispatchError> {
        self.ensure_uncommitted("send error")?;
        self.status = Some(status);
        self.error_message = message.map(str::to_string);
        Ok(())
    }

    /// Temporary redirect to `location`.
    pub fn send_redirect(&mut self, location: &str) -> Result<(), DispatchError> {
        self.ensure_uncommitted("send redirect")?;
        self.set_header(header::LOCATION, location)?;
        self.status = Some(StatusCode::FOUND);
        Ok(())
    }

    /// Clear the body only.
    pub fn reset_buffer(&mut self) -> Result<(), DispatchError> {
        self.ensure_uncommitted("reset buffer")?;
        self.body.clear();
        Ok(())
    }

    /// Clear status, headers, content type, encoding, error message and body.
    pub fn reset(&mut self) -> Result<(), DispatchError> {
        self.reset_buffer()?;
        self.status = None;
        self.headers.clear();
        self.content_type = None;
        self.charset = self.default_charset;
        self.error_message = None;
        Ok(())
    }

    fn ensure_uncommitted(&self, action: &'static str) -> Result<(), DispatchError> {
        if self.committed {
            Err(DispatchError::ResponseCommitted(action))
        } else {
            Ok(())
        }
    }

    /// Freeze the response for encoding.
    pub fn seal(self) -> SealedResponse {
        SealedResponse {
            status: self.status.unwrap_or(StatusCode::OK),
            headers: self.headers,
            body: Bytes::from(self.body),
            content_type: self.content_type,
            charset: self.charset,
            error_message: self.error_message,
        }
    }
}

fn header_pair<K, V>(name: K, value: V) -> Result<(HeaderName, HeaderValue), DispatchError>
where
    HeaderName: TryFrom<K>,
    <HeaderName as TryFrom<K>>::Error: Into<axum::http::Error>,
    HeaderValue: TryFrom<V>,
    <HeaderValue as TryFrom<V>>::Error: Into<axum::http::Error>,
{
    let name = HeaderName::try_from(name).map_err(|e| DispatchError::InvalidHeader(e.into()))?;
    let value = HeaderValue::try_from(value).map_err(|e| DispatchError::InvalidHeader(e.into()))?;
    Ok((name, value))
}

/// Immutable response handed to a platform adapter.
#[derive(Debug, Clone)]
pub struct SealedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    content_type: Option<String>,
    charset: Charset,
    error_message: Option<String>,
}

impl SealedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        headers::first(&self.headers, name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Body decoded with the declared charset; `None` if it is not valid text.
    pub fn body_text(&self) -> Option<String> {
        self.charset.decode(&self.body)
    }
}
