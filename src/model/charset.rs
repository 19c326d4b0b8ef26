//! Character encodings understood by the response writer.

use std::fmt;

use crate::error::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    UsAscii,
    Latin1,
}

impl Charset {
    /// Resolve an encoding label (case-insensitive, common aliases accepted).
    pub fn from_label(label: &str) -> Result<Self, DispatchError> {
        let normalized = label.trim().trim_matches('"').to_ascii_lowercase();
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" => Ok(Charset::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            _ => Err(DispatchError::UnsupportedCharset(label.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::UsAscii => "US-ASCII",
            Charset::Latin1 => "ISO-8859-1",
        }
    }

    /// Encode text, failing on the first character the charset cannot represent.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, DispatchError> {
        let limit = match self {
            Charset::Utf8 => return Ok(text.as_bytes().to_vec()),
            Charset::UsAscii => 0x7f,
            Charset::Latin1 => 0xff,
        };
        text.chars()
            .map(|ch| {
                let code = ch as u32;
                if code <= limit {
                    Ok(code as u8)
                } else {
                    Err(DispatchError::Unencodable {
                        ch,
                        charset: self.name(),
                    })
                }
            })
            .collect()
    }

    /// Decode bytes, returning `None` if they are not valid in this charset.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Charset::UsAscii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| b as char).collect()),
            Charset::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The `charset` parameter of a `Content-Type` value, if present.
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// The media type of a `Content-Type` value, without parameters, lowercased.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a media type carries text that can travel as a plain string.
pub fn is_textual(media_type: &str) -> bool {
    media_type.starts_with("text/")
        || media_type.ends_with("+json")
        || media_type.ends_with("+xml")
        || matches!(
            media_type,
            "application/json"
                | "application/xml"
                | "application/javascript"
                | "application/x-www-form-urlencoded"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Charset::from_label("utf-8").unwrap(), Charset::Utf8);
        assert_eq!(Charset::from_label("ISO-8859-1").unwrap(), Charset::Latin1);
        assert!(matches!(
            Charset::from_label("Shift_JIS"),
            Err(DispatchError::UnsupportedCharset(_))
        ));
    }

    #[test]
    fn test_latin1_roundtrip_and_unencodable() {
        let bytes = Charset::Latin1.encode("café").unwrap();
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(Charset::Latin1.decode(&bytes).as_deref(), Some("café"));

        let err = Charset::UsAscii.encode("café").unwrap_err();
        assert!(matches!(err, DispatchError::Unencodable { ch: 'é', .. }));
    }

    #[test]
    fn test_content_type_parsing() {
        let ct = "Text/HTML; charset=\"ISO-8859-1\"";
        assert_eq!(charset_param(ct), Some("ISO-8859-1"));
        assert_eq!(media_type(ct), "text/html");
        assert!(is_textual("application/problem+json"));
        assert!(!is_textual("image/png"));
        assert_eq!(charset_param("application/json"), None);
    }
}
