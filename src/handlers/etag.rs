//! Cache tokens (ETags) for generated images.
//!
//! The token covers every field that changes the output bytes and nothing
//! else. Payload text is length-prefixed and percent-encoded, so a `|` or
//! `"` inside it cannot shift field boundaries or break the header.

use std::fmt;

use axum::http::HeaderValue;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use super::barcode::ImageRequest;

/// Characters escaped inside the payload field.
const PAYLOAD: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'|')
    .add(b'\\');

/// Quoted entity tag derived from an [`ImageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheToken(String);

impl CacheToken {
    pub fn for_request(request: &ImageRequest) -> Self {
        Self(format!(
            "\"{}|{}|{}|{}|{}:{}|{}\"",
            request.symbology,
            request.width,
            request.height,
            request.options.security_level,
            request.text.len(),
            utf8_percent_encode(&request.text, PAYLOAD),
            request.format,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against an `If-None-Match` value.
    pub fn matches(&self, if_none_match: &HeaderValue) -> bool {
        if_none_match.as_bytes() == self.0.as_bytes()
    }

    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl fmt::Display for CacheToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::OutputFormat;
    use crate::symbology::{EncodeOptions, Symbology};

    fn request(text: &str, level: i64) -> ImageRequest {
        ImageRequest {
            symbology: Symbology::Pdf417,
            width: 200,
            height: 100,
            text: text.to_string(),
            format: OutputFormat::Gif,
            options: EncodeOptions {
                security_level: level,
            },
        }
    }

    #[test]
    fn test_token_layout() {
        let token = CacheToken::for_request(&request("DATA", 3));
        assert_eq!(token.as_str(), "\"pdf417|200|100|3|4:DATA|gif\"");
    }

    #[test]
    fn test_identical_requests_share_a_token() {
        assert_eq!(
            CacheToken::for_request(&request("DATA", 3)),
            CacheToken::for_request(&request("DATA", 3))
        );
    }

    #[test]
    fn test_every_field_changes_the_token() {
        let base = request("DATA", 3);
        let token = CacheToken::for_request(&base);

        let variants = [
            ImageRequest { symbology: Symbology::Code128, ..base.clone() },
            ImageRequest { width: 201, ..base.clone() },
            ImageRequest { height: 101, ..base.clone() },
            ImageRequest { text: "DATB".into(), ..base.clone() },
            ImageRequest { format: OutputFormat::Png, ..base.clone() },
            request("DATA", 4),
        ];
        for variant in variants {
            assert_ne!(CacheToken::for_request(&variant), token, "{:?}", variant);
        }
    }

    #[test]
    fn test_separator_in_payload_is_escaped() {
        let token = CacheToken::for_request(&request("A|0|B", 0));
        // the naive form would read "...|0|A|0|B|gif"
        assert!(!token.as_str().contains("A|0|B"));
        assert_eq!(token.as_str(), "\"pdf417|200|100|0|5:A%7C0%7CB|gif\"");
    }

    #[test]
    fn test_quotes_and_unicode_stay_header_safe() {
        let token = CacheToken::for_request(&request("say \"h\u{e9}\"", 0));
        let header = token.to_header_value().unwrap();
        assert!(token.matches(&header));
        assert!(!token.as_str()[1..token.as_str().len() - 1].contains('"'));
    }

    #[test]
    fn test_matches_is_exact() {
        let token = CacheToken::for_request(&request("DATA", 3));
        assert!(!token.matches(&HeaderValue::from_static("W/\"pdf417|200|100|3|4:DATA|gif\"")));
        assert!(!token.matches(&HeaderValue::from_static("*")));
    }
}
