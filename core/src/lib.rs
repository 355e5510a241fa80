//! Generic HTTP request pipeline underneath client-facing SDKs.
//!
//! # Overview
//! Builds requests with a pluggable parameter encoding, dispatches them
//! asynchronously through a [`Transport`] seam, and delivers the outcome
//! through a single-resolution [`ResponseFuture`]. A separate validation
//! stage ([`output_from_response`]) turns a raw response into a typed
//! [`Output`] or a classified [`ClientError`].
//!
//! # Design
//! - `GenericClient` is immutable configuration (base URL, encoding,
//!   headers, transport). Concurrent requests share one client freely.
//! - The transport is a trait, not a baked-in stack: production callers
//!   plug in the platform URL-loading facility, tests plug in ureq or a
//!   canned responder. No retry, caching, or timeout lives in this crate.
//! - Validation is pure and synchronous; it runs wherever the resolved
//!   response lands and performs no I/O.
//! - Programmer errors (malformed base URL, double resolution, form
//!   encoding of nested values) panic; everything the network can do wrong
//!   surfaces as a `ClientError`.

pub mod client;
pub mod encoding;
pub mod error;
pub mod future;
pub mod http;
pub mod output;

pub use client::{basic_authorization_header, GenericClient};
pub use encoding::{query_string, ParameterEncoding, Params};
pub use error::{ClientError, ErrorPair, NO_STATUS};
pub use future::{Deferred, ResponseFuture};
pub use http::{ClientResponse, HttpMethod, HttpRequest, Transport, TransportError};
pub use output::{
    output_from_response, standard_error_handler, standard_valid_status_codes, ErrorHandler,
    Output, OutputType,
};
