//! Request and response types

use super::{Body, Headers};

/// Outgoing HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method (e.g., "GET", "POST")
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body; `None` is distinct from an empty body
    pub body: Option<Body>,
}

impl Request {
    /// Create a request with no headers and no body
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Media type from `Content-Type`, lowercased and without parameters
    pub fn content_type(&self) -> Option<String> {
        media_type(&self.headers)
    }

    /// Body bytes, empty when there is no body
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_ref().map_or(&[][..], Body::as_bytes)
    }
}

/// HTTP response, either live or replayed from a cassette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status_code: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Body,
    /// Final URL after any redirects
    pub url: String,
    /// Text encoding used by [`Response::text`]
    pub encoding: Option<String>,
    /// Request that produced this response
    pub request: Option<Box<Request>>,
}

impl Response {
    /// Create a response with an empty body
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Headers::new(),
            body: Body::empty(),
            url: String::new(),
            encoding: None,
            request: None,
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the final URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the text encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Attach the request that produced this response
    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(Box::new(request));
        self
    }

    /// Raw body bytes
    pub fn content(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Body decoded with [`Response::encoding`]
    pub fn text(&self) -> String {
        self.body.text(self.encoding.as_deref())
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

pub(crate) fn media_type(headers: &Headers) -> Option<String> {
    headers.get("Content-Type").map(|value| {
        value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = Request::new("POST", "http://example.com/form")
            .with_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
            .with_body("key=value");

        assert_eq!(
            request.content_type().as_deref(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.body_bytes(), b"key=value");
        assert!(Request::get("http://example.com/").body.is_none());
    }

    #[test]
    fn test_response_carries_request() {
        let response = Response::new(200)
            .with_body("foo")
            .with_encoding("utf-8")
            .with_request(Request::get("http://example.com/"));

        assert_eq!(response.content(), b"foo");
        assert_eq!(response.text(), "foo");
        assert!(response.is_success());
        assert_eq!(
            response.request.as_ref().map(|r| r.url.as_str()),
            Some("http://example.com/")
        );
    }
}
