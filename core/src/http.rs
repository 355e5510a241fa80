//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and interprets `ClientResponse` values; the actual round-trip is
//! performed by a [`Transport`] implementation supplied at client
//! construction (the platform URL-loading stack, ureq in the integration
//! tests, or a canned responder in unit tests). This keeps the pipeline
//! deterministic and free of I/O dependencies.
//!
//! All fields use owned types (`String`, `Vec`, `BTreeMap`) so values can be
//! moved across threads and cloned into observer callbacks freely.

use std::collections::BTreeMap;
use std::fmt;

/// HTTP method for a request. The pipeline issues GET and POST only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
///
/// Built by `GenericClient` and handed to a [`Transport`] for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// A completed HTTP exchange: the transport produced a status line, headers,
/// and a raw body, regardless of what the status code was.
///
/// Status interpretation belongs to the output validator, not the
/// transport: a 500 with a body is still a `ClientResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ClientResponse {
    /// The raw body decoded as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The network layer failed before producing any HTTP response
/// (DNS, connect, TLS, transport-level timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Pluggable executor for one HTTP round-trip.
///
/// Implementations perform exactly one request per call and return either
/// the raw response (whatever its status) or a [`TransportError`] when no
/// response was received at all. Redirects, cookies, and TLS policy are the
/// implementation's business; this layer imposes no retry and no timeout.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<ClientResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_text_decodes_utf8() {
        let response = ClientResponse {
            url: "http://localhost/x".to_string(),
            status: 200,
            headers: BTreeMap::new(),
            body: "héllo".as_bytes().to_vec(),
        };
        assert_eq!(response.body_text(), "héllo");
    }

    #[test]
    fn body_text_replaces_invalid_utf8() {
        let response = ClientResponse {
            url: "http://localhost/x".to_string(),
            status: 200,
            headers: BTreeMap::new(),
            body: vec![0x68, 0x69, 0xff],
        };
        assert_eq!(response.body_text(), "hi\u{fffd}");
    }

    #[test]
    fn transport_error_displays_message() {
        let err = TransportError::new("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.message(), "connection refused");
    }
}
