//! Portable document form of requests, responses and interactions

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::http::{Body, Headers, Request, Response};
use crate::{Result, TapedeckError};

/// Encoding label written for text bodies
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Top-level cassette document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CassetteDocument {
    /// Interactions in recording order
    pub http_interactions: Vec<SerializedInteraction>,
    /// Name and version of the recorder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_with: Option<String>,
}

/// One stored interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedInteraction {
    /// Recorded request
    pub request: SerializedRequest,
    /// Recorded response
    pub response: SerializedResponse,
    /// When the interaction was recorded; a timestamp without an offset
    /// reads as UTC
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// Stored request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedRequest {
    /// HTTP method
    pub method: String,
    /// Absolute URL
    pub url: String,
    /// Headers as sent
    #[serde(default)]
    pub headers: Headers,
    /// Body; omitted when the request had none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<SerializedBody>,
}

/// Stored response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Headers, written as `{}` when empty
    #[serde(default)]
    pub headers: Headers,
    /// Body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<SerializedBody>,
    /// Legacy plain-text body, read but never written
    #[serde(default, skip_serializing)]
    pub content: Option<String>,
    /// Final URL
    pub url: String,
    /// Text encoding
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Stored body
///
/// Exactly one of `string` and `base64_string` is set. A bare string is
/// read as a text body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredBody")]
pub struct SerializedBody {
    /// Text encoding label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Body as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    /// Body as base64
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_string: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBody {
    Text(String),
    Fields {
        #[serde(default)]
        encoding: Option<String>,
        #[serde(default)]
        string: Option<String>,
        #[serde(default)]
        base64_string: Option<String>,
    },
}

impl From<StoredBody> for SerializedBody {
    fn from(stored: StoredBody) -> Self {
        match stored {
            StoredBody::Text(text) => Self {
                encoding: None,
                string: Some(text),
                base64_string: None,
            },
            StoredBody::Fields {
                encoding,
                string,
                base64_string,
            } => Self {
                encoding,
                string,
                base64_string,
            },
        }
    }
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC
fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

impl SerializedBody {
    /// Store `body` as text when allowed and valid UTF-8, else as base64
    pub fn from_body(body: &Body, preserve_exact_bytes: bool) -> Self {
        match body.as_str() {
            Some(text) if !preserve_exact_bytes => Self {
                encoding: Some(DEFAULT_ENCODING.to_string()),
                string: Some(text.to_string()),
                base64_string: None,
            },
            _ => Self {
                encoding: None,
                string: None,
                base64_string: Some(STANDARD.encode(body.as_bytes())),
            },
        }
    }

    /// Recover the exact bytes
    ///
    /// # Errors
    ///
    /// Returns [`TapedeckError::Deserialization`] if neither or both
    /// representations are present, or the base64 is invalid
    pub fn to_body(&self) -> Result<Body> {
        match (&self.string, &self.base64_string) {
            (Some(text), None) => Ok(Body::from(text.clone())),
            (None, Some(encoded)) => STANDARD
                .decode(encoded)
                .map(Body::from)
                .map_err(|e| TapedeckError::Deserialization(format!("Invalid base64 body: {e}"))),
            (None, None) => Err(TapedeckError::Deserialization(
                "Body has neither 'string' nor 'base64_string'".to_string(),
            )),
            (Some(_), Some(_)) => Err(TapedeckError::Deserialization(
                "Body has both 'string' and 'base64_string'".to_string(),
            )),
        }
    }
}

/// Convert a request into its stored form
pub fn serialize_request(request: &Request, preserve_exact_bytes: bool) -> SerializedRequest {
    SerializedRequest {
        method: request.method.clone(),
        url: request.url.clone(),
        headers: request.headers.clone(),
        body: request
            .body
            .as_ref()
            .map(|body| SerializedBody::from_body(body, preserve_exact_bytes)),
    }
}

/// Rebuild a request from its stored form
///
/// # Errors
///
/// Returns [`TapedeckError::Deserialization`] if the method is empty, the
/// URL is not absolute, or the body is malformed
pub fn deserialize_request(stored: &SerializedRequest) -> Result<Request> {
    if stored.method.trim().is_empty() {
        return Err(TapedeckError::Deserialization(
            "Request method is empty".to_string(),
        ));
    }
    url::Url::parse(&stored.url).map_err(|e| {
        TapedeckError::Deserialization(format!("Invalid request url '{}': {e}", stored.url))
    })?;

    Ok(Request {
        method: stored.method.clone(),
        url: stored.url.clone(),
        headers: stored.headers.clone(),
        body: stored.body.as_ref().map(SerializedBody::to_body).transpose()?,
    })
}

/// Convert a response into its stored form
pub fn serialize_response(response: &Response, preserve_exact_bytes: bool) -> SerializedResponse {
    SerializedResponse {
        status_code: response.status_code,
        headers: response.headers.clone(),
        body: Some(SerializedBody::from_body(
            &response.body,
            preserve_exact_bytes,
        )),
        content: None,
        url: response.url.clone(),
        encoding: response.encoding.clone(),
    }
}

/// Rebuild a response from its stored form
///
/// The body is a reusable in-memory buffer, so the replayed response can be
/// read any number of times.
///
/// # Errors
///
/// Returns [`TapedeckError::Deserialization`] if the status code is out of
/// range or the body is missing or malformed
pub fn deserialize_response(stored: &SerializedResponse) -> Result<Response> {
    if !(100..=999).contains(&stored.status_code) {
        return Err(TapedeckError::Deserialization(format!(
            "Status code out of range: {}",
            stored.status_code
        )));
    }

    let body = match (&stored.body, &stored.content) {
        (Some(body), _) => body.to_body()?,
        (None, Some(content)) => Body::from(content.clone()),
        (None, None) => {
            return Err(TapedeckError::Deserialization(
                "Response has neither 'body' nor 'content'".to_string(),
            ))
        }
    };

    Ok(Response {
        status_code: stored.status_code,
        headers: stored.headers.clone(),
        body,
        url: stored.url.clone(),
        encoding: stored.encoding.clone(),
        request: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_serialize_response() {
        let response = Response::new(200)
            .with_body("foo")
            .with_encoding("utf-8")
            .with_url("http://example.com");

        let value = serde_json::to_value(serialize_response(&response, false)).unwrap();
        assert_eq!(value["status_code"], 200);
        assert_eq!(value["encoding"], "utf-8");
        assert_eq!(value["body"]["string"], "foo");
        assert_eq!(value["headers"], json!({}));
        assert_eq!(value["url"], "http://example.com");
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_deserialize_legacy_content() {
        let stored: SerializedResponse = serde_json::from_value(json!({
            "content": "foo",
            "encoding": "utf-8",
            "headers": {"Content-Type": "application/json"},
            "url": "http://example.com/",
            "status_code": 200,
        }))
        .unwrap();

        let response = deserialize_response(&stored).unwrap();
        assert_eq!(response.content(), b"foo");
        assert_eq!(response.encoding.as_deref(), Some("utf-8"));
        assert_eq!(response.headers.get("content-type"), Some("application/json"));
        assert_eq!(response.url, "http://example.com/");
        assert_eq!(response.status_code, 200);
    }

    #[test]
    fn test_serialize_request() {
        let request = Request::get("http://example.com/")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("User-Agent", "tapedeck/test header")
            .with_body("key=value");

        let value = serde_json::to_value(serialize_request(&request, false)).unwrap();
        assert_eq!(value["method"], "GET");
        assert_eq!(value["url"], "http://example.com/");
        assert_eq!(
            value["headers"],
            json!({
                "Content-Type": "application/x-www-form-urlencoded",
                "User-Agent": "tapedeck/test header",
            })
        );
        assert_eq!(value["body"], json!({"encoding": "utf-8", "string": "key=value"}));
    }

    #[test]
    fn test_absent_and_empty_bodies_round_trip() {
        let absent = Request::get("http://example.com/");
        let empty = Request::get("http://example.com/").with_body("");

        let absent_value = serde_json::to_value(serialize_request(&absent, false)).unwrap();
        assert!(absent_value.get("body").is_none());

        for original in [absent, empty] {
            let stored = serialize_request(&original, false);
            let text = serde_json::to_string(&stored).unwrap();
            let back: SerializedRequest = serde_json::from_str(&text).unwrap();
            assert_eq!(deserialize_request(&back).unwrap(), original);
        }
    }

    #[test]
    fn test_binary_body_uses_base64() {
        let response = Response::new(200).with_body(vec![0xFF, 0x00, 0xFE]);
        let stored = serialize_response(&response, false);
        let body = stored.body.as_ref().unwrap();
        assert!(body.string.is_none());
        assert_eq!(body.base64_string.as_deref(), Some("/wD+"));
        assert_eq!(deserialize_response(&stored).unwrap().content(), &[0xFFu8, 0x00, 0xFE]);
    }

    #[test]
    fn test_preserve_exact_bytes_forces_base64() {
        let stored = SerializedBody::from_body(&Body::from("plain"), true);
        assert!(stored.string.is_none());
        assert_eq!(stored.to_body().unwrap().as_bytes(), b"plain");
    }

    #[test]
    fn test_missing_required_fields() {
        let missing_status = serde_json::from_value::<SerializedResponse>(json!({
            "headers": {}, "body": {"string": ""}, "url": "http://example.com/"
        }));
        assert!(missing_status.is_err());

        let missing_method = serde_json::from_value::<SerializedRequest>(json!({
            "url": "http://example.com/", "headers": {}
        }));
        assert!(missing_method.is_err());

        let missing_url = serde_json::from_value::<SerializedRequest>(json!({
            "method": "GET", "headers": {}
        }));
        assert!(missing_url.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let request = SerializedRequest {
            method: String::new(),
            url: "http://example.com/".to_string(),
            headers: Headers::new(),
            body: None,
        };
        assert!(matches!(
            deserialize_request(&request),
            Err(TapedeckError::Deserialization(_))
        ));

        let request = SerializedRequest {
            method: "GET".to_string(),
            url: "/relative".to_string(),
            ..request
        };
        assert!(matches!(
            deserialize_request(&request),
            Err(TapedeckError::Deserialization(_))
        ));

        let response = SerializedResponse {
            status_code: 42,
            headers: Headers::new(),
            body: Some(SerializedBody::from_body(&Body::empty(), false)),
            content: None,
            url: String::new(),
            encoding: None,
        };
        assert!(deserialize_response(&response).is_err());

        let response = SerializedResponse {
            status_code: 200,
            body: None,
            ..response
        };
        assert!(deserialize_response(&response).is_err());

        let bad = SerializedBody {
            encoding: None,
            string: None,
            base64_string: Some("!!!".to_string()),
        };
        assert!(bad.to_body().is_err());
    }

    #[test]
    fn test_bare_string_body() {
        let stored: SerializedRequest = serde_json::from_value(json!({
            "body": "key=value",
            "headers": {"User-Agent": "tapedeck/test header"},
            "method": "GET",
            "url": "http://example.com/",
        }))
        .unwrap();

        let request = deserialize_request(&stored).unwrap();
        assert_eq!(request.body_bytes(), b"key=value");
        assert_eq!(request.headers.get("user-agent"), Some("tapedeck/test header"));
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2013, 8, 31, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2013-08-31T00:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2013-08-31T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2013-08-31T02:00:00+02:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2013-08-31T00:00:00.250").unwrap(),
            expected + chrono::Duration::try_milliseconds(250).unwrap()
        );
        assert!(parse_timestamp("31/08/2013").is_err());
    }

    proptest! {
        #[test]
        fn prop_response_round_trip(
            status in 100u16..600,
            body in proptest::collection::vec(any::<u8>(), 0..64),
            preserve in any::<bool>(),
        ) {
            let original = Response::new(status)
                .with_header("Content-Type", "application/octet-stream")
                .with_body(body)
                .with_url("http://example.com/")
                .with_encoding("utf-8");

            let text = serde_json::to_string(&serialize_response(&original, preserve)).unwrap();
            let stored: SerializedResponse = serde_json::from_str(&text).unwrap();
            let back = deserialize_response(&stored).unwrap();

            prop_assert_eq!(back, original);
        }
    }
}
