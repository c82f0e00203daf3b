//! Content-type driven body decoding.
//!
//! The listener accepts three encodings and must never crash on a bad
//! body: decode errors surface to the handler, which degrades them to
//! "content absent" and still answers 200.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use hooktap_shared::protocol::MAX_JSON_BODY;
use hooktap_shared::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Decode a request body according to its content type.
///
/// Returns `Value::Null` for empty bodies and for encodings that carry no
/// extractable fields (raw octet streams, unknown types).
pub fn decode(headers: &HeaderMap, bytes: &[u8]) -> Result<Value> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }

    match content_type(headers) {
        Some("application/json") => {
            if bytes.len() > MAX_JSON_BODY {
                return Err(Error::BodyTooLarge {
                    size: bytes.len(),
                    limit: MAX_JSON_BODY,
                });
            }
            serde_json::from_slice(bytes).map_err(|e| Error::MalformedBody(e.to_string()))
        }
        Some("application/x-www-form-urlencoded") => {
            let fields: HashMap<String, String> = serde_urlencoded::from_bytes(bytes)
                .map_err(|e| Error::MalformedBody(e.to_string()))?;
            Ok(Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            ))
        }
        // Raw octet streams (and anything else) are logged verbatim but
        // expose no fields
        _ => Ok(Value::Null),
    }
}

/// Media type without parameters, lowercased.
fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(ct: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        h
    }

    #[test]
    fn test_json_body() {
        let value = decode(
            &headers("application/json"),
            br#"{"payload":{"bodies":[{"msg":"hello"}]}}"#,
        )
        .unwrap();
        assert_eq!(value, json!({"payload": {"bodies": [{"msg": "hello"}]}}));
    }

    #[test]
    fn test_json_with_charset_parameter() {
        let value = decode(&headers("application/json; charset=utf-8"), br#"{"a":1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_malformed_json_errors() {
        let err = decode(&headers("application/json"), b"{not json").unwrap_err();
        assert!(matches!(err, Error::MalformedBody(_)));
    }

    #[test]
    fn test_oversized_json_errors() {
        let big = vec![b' '; MAX_JSON_BODY + 1];
        let err = decode(&headers("application/json"), &big).unwrap_err();
        assert!(matches!(err, Error::BodyTooLarge { .. }));
    }

    #[test]
    fn test_form_body() {
        let value = decode(
            &headers("application/x-www-form-urlencoded"),
            b"msg_id=42&from=alice",
        )
        .unwrap();
        assert_eq!(value, json!({"msg_id": "42", "from": "alice"}));
    }

    #[test]
    fn test_octet_stream_is_absent() {
        let value = decode(&headers("application/octet-stream"), &[0xde, 0xad]).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_empty_body_is_absent() {
        assert_eq!(decode(&HeaderMap::new(), b"").unwrap(), Value::Null);
        assert_eq!(decode(&headers("application/json"), b"").unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_content_type_is_absent() {
        assert_eq!(decode(&HeaderMap::new(), b"whatever").unwrap(), Value::Null);
    }
}
