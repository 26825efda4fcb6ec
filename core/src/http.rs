//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data with owned fields. The `Fetcher`
//! builds `HttpRequest` values and classifies `HttpResponse` values; the
//! actual network round-trip lives behind the `Transport` trait, so any HTTP
//! library (or a canned in-memory double) can sit underneath. The response
//! body is raw bytes: JSON, text, and binary downloads all arrive through
//! the same field and are decoded by the classifier.

use std::fmt;

use async_trait::async_trait;

use crate::config::CredentialsMode;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// True for the verbs that carry a JSON body.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

/// An outgoing HTTP request described as plain data.
///
/// `headers` is `None` when the caller supplied no header set at all, which
/// leaves the transport free to apply its own defaults. An empty `Some` vec
/// would instead pin the request to exactly those (zero) headers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Option<Vec<(String, String)>>,
    pub body: Option<String>,
    pub credentials: Option<CredentialsMode>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Failure raised by a transport before any HTTP status is available
/// (DNS, connect, TLS, protocol errors).
#[derive(Debug, Clone)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// The network seam: one call in, one response out.
///
/// Implementations must be safe to share across tasks; the executor runs
/// each `send` on its own detached task so a timed-out call can finish in
/// the background without anyone observing it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, headers: Vec<(String, String)>) -> HttpResponse {
        HttpResponse {
            status,
            headers,
            body: Vec::new(),
        }
    }

    #[test]
    fn success_covers_exactly_2xx() {
        assert!(!response(199, Vec::new()).is_success());
        assert!(response(200, Vec::new()).is_success());
        assert!(response(204, Vec::new()).is_success());
        assert!(response(299, Vec::new()).is_success());
        assert!(!response(300, Vec::new()).is_success());
        assert!(!response(404, Vec::new()).is_success());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resp = response(
            200,
            vec![("Content-Type".to_string(), "text/plain".to_string())],
        );
        assert_eq!(resp.header("content-type"), Some("text/plain"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn body_bearing_verbs() {
        assert!(!HttpMethod::Get.has_body());
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Delete.has_body());
    }
}
