//! Request and response abstractions.
//!
//! The lifecycle only needs a handful of facts about an exchange: the request
//! method and URL, the response status and kind, and the ability to duplicate
//! a response so one copy can be stored while the other is returned. Platform
//! types (`web_sys::Request`, `web_sys::Response`) implement [`HttpRequest`]
//! and [`HttpResponse`] directly so bodies are never copied through Rust.
//!
//! [`Request`] and [`Response`] are plain owned implementations used by the
//! in-memory backends.

use crate::config::{OFFLINE_CONTENT_TYPE, OFFLINE_HTML};
use crate::error::{CacheError, FetchError};

/// Fetch-standard response type (`Response.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin, readable response.
    Basic,
    Cors,
    /// Constructed in script rather than fetched.
    Default,
    Error,
    Opaque,
    OpaqueRedirect,
}

/// An intercepted or synthesized request.
pub trait HttpRequest: Sized {
    /// Build a plain `GET` for `url` (used for seed resources).
    fn get(url: &str) -> Result<Self, FetchError>;

    fn method(&self) -> String;

    fn url(&self) -> String;

    /// Only `GET` requests may be stored in a cache.
    fn is_cacheable(&self) -> bool {
        self.method().eq_ignore_ascii_case("GET")
    }
}

/// A response from the network or a cache store.
pub trait HttpResponse: Sized {
    fn status(&self) -> u16;

    fn kind(&self) -> ResponseKind;

    /// Duplicate the response so it can be consumed twice.
    fn duplicate(&self) -> Result<Self, CacheError>;

    /// Build the synthesized "you are offline" page.
    fn offline_notice() -> Result<Self, FetchError>;

    fn is_ok(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Status 200 and same-origin: the only responses written back on a miss.
    fn is_cacheable(&self) -> bool {
        self.status() == 200 && self.kind() == ResponseKind::Basic
    }
}

// =============================================================================
// Owned Types
// =============================================================================

/// Owned request: method, URL and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl HttpRequest for Request {
    fn get(url: &str) -> Result<Self, FetchError> {
        if url.is_empty() {
            return Err(FetchError::InvalidRequest {
                url: url.to_string(),
                message: "empty URL".to_string(),
            });
        }
        Ok(Self::new("GET", url))
    }

    fn method(&self) -> String {
        self.method.clone()
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}

/// Owned response: status, kind, headers and a fully buffered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// A same-origin `200 OK` with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Basic,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl HttpResponse for Response {
    fn status(&self) -> u16 {
        self.status
    }

    fn kind(&self) -> ResponseKind {
        self.kind
    }

    fn duplicate(&self) -> Result<Self, CacheError> {
        Ok(self.clone())
    }

    fn offline_notice() -> Result<Self, FetchError> {
        Ok(Self::ok(OFFLINE_HTML)
            .with_kind(ResponseKind::Default)
            .with_header("Content-Type", OFFLINE_CONTENT_TYPE))
    }
}
