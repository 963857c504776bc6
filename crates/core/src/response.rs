//! Response values.
//!
//! Reading a body (`bytes`, `text`) consumes the `Response`, so a body can be
//! read at most once. Any path that both returns a response and persists it
//! must `clone()` first; the clone is an independent, fully readable copy.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Response type as seen from the page's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin.
    #[default]
    Basic,
    Cors,
    Opaque,
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::Error => "error",
        }
    }
}

/// A response with a single-use body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    status_text: String,
    headers: BTreeMap<String, String>,
    url: Option<String>,
    response_type: ResponseType,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: default_status_text(status).to_string(),
            headers: BTreeMap::new(),
            url: None,
            response_type: ResponseType::Basic,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// Header names are stored lowercase.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Only complete same-origin responses may be written to a store.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }

    /// Body length without reading it.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Read the body.
    pub fn bytes(self) -> Bytes {
        self.body
    }

    /// Read the body as text, replacing invalid UTF-8.
    pub fn text(self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn default_status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// Persisted snapshot of a response, the value half of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoredResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub url: Option<String>,
    pub response_type: ResponseType,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl From<Response> for StoredResponse {
    fn from(response: Response) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            url: response.url,
            response_type: response.response_type,
            body: response.body.to_vec(),
            stored_at: Utc::now().to_rfc3339(),
        }
    }
}

impl From<StoredResponse> for Response {
    fn from(stored: StoredResponse) -> Self {
        Self {
            status: stored.status,
            status_text: stored.status_text,
            headers: stored.headers,
            url: stored.url,
            response_type: stored.response_type,
            body: Bytes::from(stored.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_independently_readable() {
        let response = Response::ok("body { color: red }").with_header("Content-Type", "text/css");
        let copy = response.clone();

        assert_eq!(copy.text(), "body { color: red }");
        assert_eq!(response.header("content-type"), Some("text/css"));
        assert_eq!(response.text(), "body { color: red }");
    }

    #[test]
    fn test_cacheable_requires_200_basic() {
        assert!(Response::ok("x").is_cacheable());
        assert!(!Response::new(404, "x").is_cacheable());
        assert!(!Response::new(206, "x").is_cacheable());
        assert!(!Response::ok("x").with_type(ResponseType::Opaque).is_cacheable());
        assert!(!Response::ok("x").with_type(ResponseType::Cors).is_cacheable());
    }

    #[test]
    fn test_stored_response_preserves_fields() {
        let response = Response::new(200, "<h1>home</h1>")
            .with_header("content-type", "text/html")
            .with_url("https://blog.example.com/");
        let stored = StoredResponse::from(response);
        assert_eq!(stored.status_text, "OK");
        assert_eq!(stored.body, b"<h1>home</h1>".to_vec());

        let back = Response::from(stored);
        assert_eq!(back.url(), Some("https://blog.example.com/"));
        assert_eq!(back.header("Content-Type"), Some("text/html"));
        assert_eq!(back.text(), "<h1>home</h1>");
    }
}
