//! Classified request errors.
//!
//! # Design
//! A single `ClientError` value covers all three failure shapes: transport
//! failure (no response at all, status 0), disallowed status, and output
//! shape mismatch. Exactly one of `server_errors` / `transport_error` is
//! populated for a given failure; both may be absent when the only signal
//! is a status code outside the accepted set. Telemetry consumers serialize
//! errors through [`ClientError::keyed_description`] rather than `Display`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Map, Value};

use crate::http::TransportError;

/// Status code recorded when the request never reached the network layer.
pub const NO_STATUS: u16 = 0;

/// One structured complaint extracted from a server error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPair {
    pub name: String,
    pub message: Option<String>,
}

impl ErrorPair {
    pub fn new(name: impl Into<String>, message: Option<&str>) -> Self {
        Self {
            name: name.into(),
            message: message.map(str::to_string),
        }
    }
}

/// A classified request failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientError {
    /// HTTP status, or [`NO_STATUS`] when no response was received.
    pub status_code: u16,
    pub url: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    /// Raw body decoded as text, when no structured payload was found.
    pub output: Option<String>,
    /// Decoded structured error payload, when the body was a JSON object.
    pub server_errors: Option<Map<String, Value>>,
    /// Complaints extracted from `server_errors` by the caller's
    /// classification function. Empty when no function ran.
    pub error_pairs: Vec<ErrorPair>,
    pub transport_error: Option<TransportError>,
}

impl ClientError {
    /// Failure of the network layer itself: no status, headers, or body.
    pub fn transport(url: impl Into<String>, error: TransportError) -> Self {
        Self {
            status_code: NO_STATUS,
            url: Some(url.into()),
            transport_error: Some(error),
            ..Self::default()
        }
    }

    /// Mapping rendering of all populated fields, suitable for
    /// serialization into a diagnostic report.
    pub fn keyed_description(&self) -> Value {
        let mut description = Map::new();
        description.insert("statusCode".to_string(), json!(self.status_code));
        if let Some(url) = &self.url {
            description.insert("urlString".to_string(), json!(url));
        }
        if let Some(headers) = &self.headers {
            description.insert("headers".to_string(), json!(headers));
        }
        if let Some(output) = &self.output {
            description.insert("outputString".to_string(), json!(output));
        }
        if let Some(server_errors) = &self.server_errors {
            description.insert(
                "serverErrors".to_string(),
                Value::Object(server_errors.clone()),
            );
        }
        if !self.error_pairs.is_empty() {
            let pairs: Vec<Value> = self
                .error_pairs
                .iter()
                .map(|pair| json!({"name": pair.name, "message": pair.message}))
                .collect();
            description.insert("errorPairs".to_string(), Value::Array(pairs));
        }
        if let Some(transport_error) = &self.transport_error {
            description.insert("networkError".to_string(), json!(transport_error.message()));
        }
        Value::Object(description)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // One line naming the failure shape; full detail lives in
        // keyed_description.
        if let Some(transport_error) = &self.transport_error {
            return write!(f, "transport failure: {transport_error}");
        }
        write!(f, "HTTP {}", self.status_code)?;
        if let Some(url) = &self.url {
            write!(f, " at {url}")?;
        }
        if let Some(first) = self.error_pairs.first() {
            write!(f, ": {}", first.name)?;
            if let Some(message) = &first.message {
                write!(f, " ({message})")?;
            }
        } else if let Some(output) = &self.output {
            write!(f, ": {output}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_constructor_uses_sentinel_status() {
        let err = ClientError::transport(
            "http://localhost/x",
            TransportError::new("connection refused"),
        );
        assert_eq!(err.status_code, NO_STATUS);
        assert_eq!(err.url.as_deref(), Some("http://localhost/x"));
        assert!(err.headers.is_none());
        assert!(err.output.is_none());
        assert!(err.server_errors.is_none());
        assert_eq!(
            err.transport_error.as_ref().map(TransportError::message),
            Some("connection refused")
        );
    }

    #[test]
    fn display_names_the_failure_shape() {
        let transport =
            ClientError::transport("http://localhost/x", TransportError::new("no route"));
        assert_eq!(transport.to_string(), "transport failure: no route");

        let status = ClientError {
            status_code: 404,
            url: Some("http://localhost/x".to_string()),
            error_pairs: vec![ErrorPair::new("missing", Some("no such thing"))],
            ..ClientError::default()
        };
        assert_eq!(
            status.to_string(),
            "HTTP 404 at http://localhost/x: missing (no such thing)"
        );

        let shape = ClientError {
            status_code: 200,
            output: Some("not json".to_string()),
            ..ClientError::default()
        };
        assert_eq!(shape.to_string(), "HTTP 200: not json");
    }

    #[test]
    fn keyed_description_includes_only_populated_fields() {
        let err = ClientError::transport("http://localhost/x", TransportError::new("refused"));
        let description = err.keyed_description();
        assert_eq!(description["statusCode"], 0);
        assert_eq!(description["urlString"], "http://localhost/x");
        assert_eq!(description["networkError"], "refused");
        let object = description.as_object().unwrap();
        assert!(!object.contains_key("headers"));
        assert!(!object.contains_key("outputString"));
        assert!(!object.contains_key("serverErrors"));
        assert!(!object.contains_key("errorPairs"));
    }

    #[test]
    fn keyed_description_renders_server_errors_and_pairs() {
        let payload: Map<String, Value> =
            serde_json::from_str(r#"{"errors":[{"name":"x","message":"bad"}]}"#).unwrap();
        let err = ClientError {
            status_code: 422,
            headers: Some(BTreeMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )])),
            server_errors: Some(payload.clone()),
            error_pairs: vec![ErrorPair::new("x", Some("bad"))],
            ..ClientError::default()
        };
        let description = err.keyed_description();
        assert_eq!(description["statusCode"], 422);
        assert_eq!(description["serverErrors"], Value::Object(payload));
        assert_eq!(description["errorPairs"][0]["name"], "x");
        assert_eq!(description["errorPairs"][0]["message"], "bad");
        assert_eq!(description["headers"]["content-type"], "application/json");
    }
}
