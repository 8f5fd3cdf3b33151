//! Body matcher: bytes, form pairs or JSON values

use std::borrow::Cow;

use crate::http::Request;

use super::Matcher;

/// Matches on the request body
///
/// Form-encoded bodies compare as unordered sets of decoded pairs and JSON
/// bodies compare structurally, when both sides carry the same media type.
/// Everything else compares byte for byte. A missing body equals an empty
/// one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyMatcher;

impl Matcher for BodyMatcher {
    fn matches(&self, candidate: &Request, recorded: &Request) -> bool {
        let left = candidate.body_bytes();
        let right = recorded.body_bytes();
        if left == right {
            return true;
        }

        let media_type = candidate.content_type();
        if media_type != recorded.content_type() {
            return false;
        }

        match media_type.as_deref() {
            Some("application/x-www-form-urlencoded") => {
                match (form_pairs(left), form_pairs(right)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            Some(kind) if kind == "application/json" || kind.ends_with("+json") => {
                match (
                    serde_json::from_slice::<serde_json::Value>(left),
                    serde_json::from_slice::<serde_json::Value>(right),
                ) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

/// Decode `application/x-www-form-urlencoded` pairs, sorted
fn form_pairs(body: &[u8]) -> Option<Vec<(String, String)>> {
    let text = std::str::from_utf8(body).ok()?;
    let mut pairs = text
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect::<Option<Vec<_>>>()?;
    pairs.sort();
    Some(pairs)
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(content_type: Option<&str>, body: &str) -> Request {
        let request = Request::new("POST", "http://example.com/").with_body(body.to_string());
        match content_type {
            Some(value) => request.with_header("Content-Type", value),
            None => request,
        }
    }

    #[test]
    fn test_exact_bytes() {
        assert!(BodyMatcher.matches(&post(None, "abc"), &post(None, "abc")));
        assert!(!BodyMatcher.matches(&post(None, "abc"), &post(None, "abd")));
        assert!(BodyMatcher.matches(&Request::get("http://example.com/"), &post(None, "")));
    }

    #[test]
    fn test_form_bodies() {
        let form = Some("application/x-www-form-urlencoded");
        assert!(BodyMatcher.matches(&post(form, "b=2&a=hello+world"), &post(form, "a=hello%20world&b=2")));
        assert!(!BodyMatcher.matches(&post(form, "a=1"), &post(form, "a=2")));
    }

    #[test]
    fn test_json_bodies() {
        let json = Some("application/json; charset=utf-8");
        assert!(BodyMatcher.matches(&post(json, r#"{"a": 1, "b": [1, 2]}"#), &post(json, r#"{"b":[1,2],"a":1}"#)));
        assert!(!BodyMatcher.matches(&post(json, r#"{"a": 1}"#), &post(json, r#"{"a": 2}"#)));
    }

    #[test]
    fn test_media_type_mismatch() {
        assert!(!BodyMatcher.matches(
            &post(Some("application/json"), r#"{"a":1}"#),
            &post(Some("text/plain"), r#"{ "a": 1 }"#)
        ));
    }
}
