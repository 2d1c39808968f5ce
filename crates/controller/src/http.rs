//! Minimal request/response model.
//!
//! Only what the controller's caching decisions look at: method and URL on
//! the way in; status, response type, redirect flag and body on the way out.

use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    #[display("GET")]
    Get,
    #[display("HEAD")]
    Head,
    #[display("POST")]
    Post,
    #[display("PUT")]
    Put,
    #[display("DELETE")]
    Delete,
}

/// A request, keyed exactly (method and URL) in cache stores.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
#[display("{method} {url}")]
pub struct Request {
    pub method: Method,
    pub url: String,
}
impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into() }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }
}

/// Where a response came from, as the host classifies it.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin.
    #[default]
    Basic,
    Cors,
    Opaque,
    OpaqueRedirect,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub redirected: bool,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}
impl Response {
    /// A same-origin, non-redirected response.
    pub fn basic(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, kind: ResponseKind::Basic, redirected: false, headers: Vec::new(), body: body.into() }
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_redirected(mut self, redirected: bool) -> Self {
        self.redirected = redirected;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    /// Status in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether a runtime fetch may write this response into the cache.
    ///
    /// Only exactly 200, same-origin and not the result of a redirect.
    /// Anything else is passed through to the consumer untouched.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic && !self.redirected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Response::basic(200, "ok"), true)]
    #[case(Response::basic(204, ""), false)]
    #[case(Response::basic(404, "missing"), false)]
    #[case(Response::basic(200, "ok").with_kind(ResponseKind::Cors), false)]
    #[case(Response::basic(200, "ok").with_kind(ResponseKind::Opaque), false)]
    #[case(Response::basic(200, "ok").with_redirected(true), false)]
    fn test_is_cacheable(#[case] response: Response, #[case] cacheable: bool) {
        assert_eq!(response.is_cacheable(), cacheable);
    }

    #[test]
    fn test_is_ok() {
        assert!(Response::basic(204, "").is_ok());
        assert!(!Response::basic(304, "").is_ok());
        assert!(!Response::basic(500, "").is_ok());
    }

    #[test]
    fn test_header_lookup() {
        let response = Response::basic(200, "").with_header("Content-Type", "text/html");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_request_display() {
        assert_eq!(Request::get("./app.js").to_string(), "GET ./app.js");
    }
}
