//! Typed output extraction and error classification.
//!
//! # Design
//! The validator is pure: it consumes a [`ClientResponse`] plus the
//! caller's acceptance policy (valid status set, required output shape,
//! optional error-classification function) and produces either a typed
//! [`Output`] or a [`ClientError`]. It runs synchronously on whichever
//! thread holds the resolved response and performs no I/O.
//!
//! Classification functions are per call-site, not per client: the same
//! client can serve endpoints with different error payload conventions.

use serde_json::{Map, Value};

use crate::error::{ClientError, ErrorPair};
use crate::http::ClientResponse;

/// Expected decoded JSON shape of a successful body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Body is ignored; may be zero-length.
    Empty,
    Object,
    Array,
    String,
    Number,
}

/// A successful body, decoded and shape-checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Empty,
    Object(Map<String, Value>),
    Array(Vec<Value>),
    String(String),
    Number(serde_json::Number),
}

/// Maps a decoded server error payload to a sequence of complaints.
pub type ErrorHandler = dyn Fn(&Map<String, Value>) -> Vec<ErrorPair>;

/// The conventional success range, for callers without a custom
/// acceptance policy.
pub fn standard_valid_status_codes() -> Vec<u16> {
    (200..300).collect()
}

/// Classification function extracting complaints from an array of objects
/// under `key`, each carrying a `"name"` and an optional `"message"`.
/// Entries of the wrong shape are skipped, not fatal.
pub fn standard_error_handler(key: &str) -> impl Fn(&Map<String, Value>) -> Vec<ErrorPair> {
    let key = key.to_string();
    move |payload| {
        let Some(Value::Array(entries)) = payload.get(&key) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| {
                let object = entry.as_object()?;
                let name = object.get("name")?.as_str()?.to_string();
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(ErrorPair { name, message })
            })
            .collect()
    }
}

/// Turn a raw response into a typed result.
///
/// A status outside `valid_codes` is classified first; an accepted status
/// is then decoded and shape-checked against `required`. A shape mismatch
/// (including invalid JSON for a non-`Empty` shape) carries the raw body
/// text and no server errors.
pub fn output_from_response(
    response: &ClientResponse,
    valid_codes: &[u16],
    required: OutputType,
    error_handler: Option<&ErrorHandler>,
) -> Result<Output, ClientError> {
    if !valid_codes.contains(&response.status) {
        return Err(status_error(response, error_handler));
    }
    if required == OutputType::Empty {
        return Ok(Output::Empty);
    }
    let decoded: Option<Value> = serde_json::from_slice(&response.body).ok();
    match (required, decoded) {
        (OutputType::Object, Some(Value::Object(object))) => Ok(Output::Object(object)),
        (OutputType::Array, Some(Value::Array(items))) => Ok(Output::Array(items)),
        (OutputType::String, Some(Value::String(text))) => Ok(Output::String(text)),
        (OutputType::Number, Some(Value::Number(number))) => Ok(Output::Number(number)),
        (_, _) => Err(shape_error(response)),
    }
}

/// Classify a response whose status fell outside the accepted set.
///
/// A body decoding to a JSON object becomes `server_errors` (run through
/// the handler, when supplied, for `error_pairs`); anything else is kept
/// as raw text in `output`.
fn status_error(response: &ClientResponse, error_handler: Option<&ErrorHandler>) -> ClientError {
    tracing::warn!(
        status = response.status,
        url = %response.url,
        "response status outside accepted set"
    );
    let mut error = ClientError {
        status_code: response.status,
        url: Some(response.url.clone()),
        headers: Some(response.headers.clone()),
        ..ClientError::default()
    };
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(payload)) => {
            if let Some(handler) = error_handler {
                error.error_pairs = handler(&payload);
            }
            error.server_errors = Some(payload);
        }
        _ => error.output = Some(response.body_text()),
    }
    error
}

fn shape_error(response: &ClientResponse) -> ClientError {
    tracing::warn!(
        status = response.status,
        url = %response.url,
        "response body did not match required output shape"
    );
    ClientError {
        status_code: response.status,
        url: Some(response.url.clone()),
        headers: Some(response.headers.clone()),
        output: Some(response.body_text()),
        ..ClientError::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn response(status: u16, body: &str) -> ClientResponse {
        ClientResponse {
            url: "http://localhost/things".to_string(),
            status,
            headers: BTreeMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.as_bytes().to_vec(),
        }
    }

    fn standard() -> Vec<u16> {
        standard_valid_status_codes()
    }

    #[test]
    fn standard_codes_cover_the_2xx_range() {
        let codes = standard();
        assert!(codes.contains(&200));
        assert!(codes.contains(&204));
        assert!(codes.contains(&299));
        assert!(!codes.contains(&199));
        assert!(!codes.contains(&300));
        assert!(!codes.contains(&404));
    }

    #[test]
    fn valid_status_with_matching_object_succeeds() {
        let result = output_from_response(
            &response(200, r#"{"name":"widget","count":3}"#),
            &standard(),
            OutputType::Object,
            None,
        );
        match result.unwrap() {
            Output::Object(object) => {
                assert_eq!(object["name"], "widget");
                assert_eq!(object["count"], 3);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn valid_status_with_matching_array_succeeds() {
        let result = output_from_response(
            &response(200, r#"[1,2,3]"#),
            &standard(),
            OutputType::Array,
            None,
        );
        assert_eq!(
            result.unwrap(),
            Output::Array(vec![1.into(), 2.into(), 3.into()])
        );
    }

    #[test]
    fn valid_status_with_matching_string_and_number_succeed() {
        let result = output_from_response(
            &response(200, r#""hello""#),
            &standard(),
            OutputType::String,
            None,
        );
        assert_eq!(result.unwrap(), Output::String("hello".to_string()));

        let result = output_from_response(
            &response(200, "42"),
            &standard(),
            OutputType::Number,
            None,
        );
        assert_eq!(result.unwrap(), Output::Number(42.into()));
    }

    #[test]
    fn empty_shape_ignores_the_body() {
        let result = output_from_response(
            &response(204, ""),
            &standard(),
            OutputType::Empty,
            None,
        );
        assert_eq!(result.unwrap(), Output::Empty);

        // Even a non-JSON body succeeds when Empty is required.
        let result = output_from_response(
            &response(200, "whatever"),
            &standard(),
            OutputType::Empty,
            None,
        );
        assert_eq!(result.unwrap(), Output::Empty);
    }

    #[test]
    fn shape_mismatch_carries_raw_body_and_no_server_errors() {
        let result = output_from_response(
            &response(200, "not json"),
            &standard(),
            OutputType::Object,
            None,
        );
        let err = result.unwrap_err();
        assert_eq!(err.status_code, 200);
        assert_eq!(err.output.as_deref(), Some("not json"));
        assert!(err.server_errors.is_none());
        assert!(err.error_pairs.is_empty());
        assert!(err.transport_error.is_none());
    }

    #[test]
    fn wrong_json_shape_is_a_mismatch_too() {
        let result = output_from_response(
            &response(200, r#"[1,2,3]"#),
            &standard(),
            OutputType::Object,
            None,
        );
        let err = result.unwrap_err();
        assert_eq!(err.output.as_deref(), Some("[1,2,3]"));
        assert!(err.server_errors.is_none());
    }

    #[test]
    fn disallowed_status_with_structured_payload_yields_pairs() {
        let handler = standard_error_handler("errors");
        let result = output_from_response(
            &response(404, r#"{"errors":[{"name":"x","message":"bad"}]}"#),
            &standard(),
            OutputType::Object,
            Some(&handler),
        );
        let err = result.unwrap_err();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.url.as_deref(), Some("http://localhost/things"));
        assert_eq!(err.error_pairs, vec![ErrorPair::new("x", Some("bad"))]);
        let payload = err.server_errors.unwrap();
        assert_eq!(payload["errors"][0]["name"], "x");
        assert!(err.output.is_none());
    }

    #[test]
    fn disallowed_status_without_handler_keeps_payload_only() {
        let result = output_from_response(
            &response(500, r#"{"errors":[{"name":"x"}]}"#),
            &standard(),
            OutputType::Object,
            None,
        );
        let err = result.unwrap_err();
        assert!(err.server_errors.is_some());
        assert!(err.error_pairs.is_empty());
    }

    #[test]
    fn disallowed_status_with_unstructured_body_keeps_raw_text() {
        let result = output_from_response(
            &response(502, "bad gateway"),
            &standard(),
            OutputType::Object,
            None,
        );
        let err = result.unwrap_err();
        assert_eq!(err.status_code, 502);
        assert_eq!(err.output.as_deref(), Some("bad gateway"));
        assert!(err.server_errors.is_none());
    }

    #[test]
    fn custom_valid_set_overrides_the_standard_range() {
        // 404 treated as acceptable, body still shape-checked.
        let result = output_from_response(
            &response(404, r#"{"missing":true}"#),
            &[200, 404],
            OutputType::Object,
            None,
        );
        assert!(matches!(result, Ok(Output::Object(_))));

        // 200 outside a custom set is a failure.
        let result = output_from_response(
            &response(200, "{}"),
            &[204],
            OutputType::Empty,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn standard_handler_skips_malformed_entries() {
        let handler = standard_error_handler("errors");
        let payload: Map<String, Value> = serde_json::from_str(
            r#"{"errors":[{"name":"x","message":"bad"},{"msg":"no name"},"junk",{"name":"y"}]}"#,
        )
        .unwrap();
        assert_eq!(
            handler(&payload),
            vec![
                ErrorPair::new("x", Some("bad")),
                ErrorPair::new("y", None),
            ]
        );
    }

    #[test]
    fn standard_handler_with_missing_key_yields_nothing() {
        let handler = standard_error_handler("errors");
        let payload: Map<String, Value> =
            serde_json::from_str(r#"{"faults":[{"name":"x"}]}"#).unwrap();
        assert!(handler(&payload).is_empty());
    }
}
