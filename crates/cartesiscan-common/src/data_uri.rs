//! Inline `data:` URI decoding.
//!
//! Some contracts embed their metadata directly in the URI instead of
//! pointing to a server. These documents never go through the HTTP path.

use base64::Engine;

const JSON_BASE64_PREFIX: &str = "data:application/json;base64,";
const JSON_PREFIX: &str = "data:application/json,";

/// Decode the payload of a `data:` URI.
///
/// Supports:
/// - `data:application/json;base64,<encoded>`
/// - `data:application/json,<url-encoded>`
/// - other media types, base64 or URL-encoded
///
/// Returns None when the input is not a data URI or the payload is malformed.
pub fn decode_data_uri(uri: &str) -> Option<String> {
    if !uri.starts_with("data:") {
        return None;
    }

    // `#` would otherwise be read as a fragment: https://github.com/servo/rust-url/issues/908
    let uri = uri.replace('#', "%23");

    if let Some(encoded) = uri.strip_prefix(JSON_BASE64_PREFIX) {
        return base64_decode(encoded);
    }

    if let Some(body) = uri.strip_prefix(JSON_PREFIX) {
        return Some(url_decode(body));
    }

    let comma = uri.find(',')?;
    let header = &uri[5..comma];
    let body = &uri[comma + 1..];

    if header.split(';').any(|part| part == "base64") {
        base64_decode(body)
    } else {
        Some(url_decode(body))
    }
}

/// Decode a `data:` URI and parse its payload as JSON.
pub fn decode_json_data_uri(uri: &str) -> Option<serde_json::Value> {
    let payload = decode_data_uri(uri)?;
    match serde_json::from_str(&payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(
                target: "cartesiscan_common::data_uri",
                error = %e,
                "Data URI payload is not valid JSON"
            );
            None
        }
    }
}

fn url_decode(body: &str) -> String {
    urlencoding::decode(body)
        .map_or_else(|_| body.to_string(), std::borrow::Cow::into_owned)
}

fn base64_decode(input: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_json() {
        let uri = "data:application/json;base64,eyJuYW1lIjoidGVzdCJ9";
        assert_eq!(decode_data_uri(uri), Some(r#"{"name":"test"}"#.to_string()));
    }

    #[test]
    fn test_decode_url_encoded_json() {
        let uri = "data:application/json,%7B%22name%22%3A%22test%22%7D";
        assert_eq!(decode_data_uri(uri), Some(r#"{"name":"test"}"#.to_string()));
    }

    #[test]
    fn test_decode_generic_media_type() {
        let uri = "data:text/plain;charset=utf-8;base64,aGVsbG8=";
        assert_eq!(decode_data_uri(uri), Some("hello".to_string()));
    }

    #[test]
    fn test_decode_hash_in_payload() {
        let uri = r##"data:application/json,{"name":"#1"}"##;
        let value = decode_json_data_uri(uri).unwrap();
        assert_eq!(value["name"], "#1");
    }

    #[test]
    fn test_not_a_data_uri() {
        assert_eq!(decode_data_uri("https://example.com/1.json"), None);
        assert_eq!(decode_data_uri("data:no-comma"), None);
        assert_eq!(decode_json_data_uri("data:application/json,not-json"), None);
    }
}
