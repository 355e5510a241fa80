//! Fixture HTTP server for the generic-client integration tests.
//!
//! Serves one endpoint per output shape the validator knows about, an echo
//! pair for inspecting what the client actually sent, and a protected
//! route returning the structured `{"errors":[...]}` payload the standard
//! error handler expects.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

pub fn app() -> Router {
    Router::new()
        .route("/echo", get(echo_query).post(echo_body))
        .route("/widgets", get(list_widgets))
        .route("/greeting", get(greeting))
        .route("/count", get(count))
        .route("/plain", get(plain))
        .route("/empty", get(empty))
        .route("/protected", get(protected))
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Echo the decoded query parameters back as a JSON object.
async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "query": params }))
}

/// Echo the request body and content type back as a JSON object.
async fn echo_body(headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    Json(json!({ "contentType": content_type, "body": body }))
}

async fn list_widgets() -> Json<Value> {
    Json(json!([
        { "name": "sprocket" },
        { "name": "flange" },
    ]))
}

async fn greeting() -> Json<Value> {
    Json(json!("hello"))
}

async fn count() -> Json<Value> {
    Json(json!(42))
}

async fn plain() -> &'static str {
    "just some text"
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// 401 with a structured error payload unless an Authorization header is
/// present.
async fn protected(headers: HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if headers.contains_key(header::AUTHORIZATION) {
        Ok(Json(json!({ "secret": "data" })))
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "errors": [
                    { "name": "unauthorized", "message": "missing credentials" },
                ]
            })),
        ))
    }
}
