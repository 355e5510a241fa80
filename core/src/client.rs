//! Request construction and asynchronous dispatch.
//!
//! # Design
//! `GenericClient` is an immutable configuration bundle: parsed base URL,
//! parameter encoding, custom headers, and a shared [`Transport`]. It holds
//! no request-scoped state, so one client can serve any number of
//! concurrent requests. `get`/`post` build an [`HttpRequest`], hand it to
//! the transport on a background thread, and return a pending
//! [`ResponseFuture`] immediately; the calling thread never blocks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::thread;

use base64::prelude::*;
use url::Url;

use crate::encoding::{query_string, ParameterEncoding, Params};
use crate::error::ClientError;
use crate::future::ResponseFuture;
use crate::http::{HttpMethod, HttpRequest, Transport};

/// Immutable configuration bundle issuing HTTP requests.
#[derive(Clone)]
pub struct GenericClient {
    base_url: Url,
    encoding: ParameterEncoding,
    headers: BTreeMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl GenericClient {
    /// Client with JSON encoding and no custom headers.
    ///
    /// # Panics
    /// Panics on a malformed base URL; constructing a client against an
    /// unparseable URL is a programmer error.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self::with_encoding(base_url, ParameterEncoding::Json, transport)
    }

    /// Client with an explicit encoding strategy.
    ///
    /// # Panics
    /// Panics on a malformed base URL.
    pub fn with_encoding(
        base_url: &str,
        encoding: ParameterEncoding,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::with_encoding_and_headers(base_url, encoding, BTreeMap::new(), transport)
    }

    /// Client with an explicit encoding strategy and custom headers sent on
    /// every request.
    ///
    /// # Panics
    /// Panics on a malformed base URL.
    pub fn with_encoding_and_headers(
        base_url: &str,
        encoding: ParameterEncoding,
        headers: BTreeMap<String, String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url = Url::parse(base_url)
            .unwrap_or_else(|e| panic!("malformed base URL {base_url:?}: {e}"));
        Self {
            base_url,
            encoding,
            headers,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Issue a GET request; parameters travel as a percent-encoded query
    /// string (a custom encoding's output is appended verbatim).
    pub fn get(&self, params: &Params) -> ResponseFuture {
        self.dispatch(self.build_get(params))
    }

    /// Issue a POST request; parameters are encoded into the body with the
    /// client's strategy and content type.
    pub fn post(&self, params: &Params) -> ResponseFuture {
        self.dispatch(self.build_post(params))
    }

    fn build_get(&self, params: &Params) -> HttpRequest {
        let mut url = self.base_url.clone();
        if !params.is_empty() {
            let query = match &self.encoding {
                ParameterEncoding::Custom(encode) => encode(params),
                _ => query_string(params),
            };
            url.set_query(Some(&query));
        }
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: self.headers.clone(),
            body: None,
        }
    }

    fn build_post(&self, params: &Params) -> HttpRequest {
        let mut headers = self.headers.clone();
        if let Some(content_type) = self.encoding.content_type() {
            // A caller-supplied Content-Type wins over the strategy's.
            headers
                .entry("Content-Type".to_string())
                .or_insert_with(|| content_type.to_string());
        }
        let body = (!params.is_empty()).then(|| self.encoding.encode(params));
        HttpRequest {
            method: HttpMethod::Post,
            url: self.base_url.to_string(),
            headers,
            body,
        }
    }

    /// One background thread per request; the future's resolution slot is
    /// the only state shared with the caller.
    fn dispatch(&self, request: HttpRequest) -> ResponseFuture {
        let future = ResponseFuture::pending();
        let resolver = future.clone();
        let transport = Arc::clone(&self.transport);
        let url = request.url.clone();
        tracing::debug!(method = ?request.method, url = %url, "dispatching request");
        thread::spawn(move || match transport.execute(request) {
            Ok(response) => {
                tracing::debug!(status = response.status, url = %url, "request resolved");
                resolver.resolve(response);
            }
            Err(error) => {
                tracing::debug!(error = %error, url = %url, "transport failure");
                resolver.reject(ClientError::transport(url, error));
            }
        });
        future
    }
}

impl fmt::Debug for GenericClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericClient")
            .field("base_url", &self.base_url.as_str())
            .field("encoding", &self.encoding)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Basic-Authentication header mapping for a username/password pair,
/// usable as part of a client's custom headers.
pub fn basic_authorization_header(username: &str, password: &str) -> BTreeMap<String, String> {
    let credentials = BASE64_STANDARD.encode(format!("{username}:{password}"));
    BTreeMap::from([("Authorization".to_string(), format!("Basic {credentials}"))])
}
