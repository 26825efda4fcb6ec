use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::RawQuery,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;

pub const DOWNLOAD_BYTES: &[u8] = b"\x89attachment-payload\x00\x01";

/// What `/echo` reflects back about the request it received.
#[derive(Debug, Serialize)]
pub struct EchoReply {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", get(json_payload))
        .route("/json-utf8", get(json_payload_utf8))
        .route("/text", get(text_payload))
        .route("/download", get(download))
        .route("/query", get(echo_query))
        .route("/protected", get(protected))
        .route("/boom", get(boom))
        .route("/slow", get(slow))
        .route("/echo", post(echo).put(echo).patch(echo).delete(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json_payload() -> Json<serde_json::Value> {
    Json(serde_json::json!({"service": "mock", "ready": true}))
}

async fn json_payload_utf8() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        r#"{"service":"mock","ready":true}"#,
    )
}

async fn text_payload() -> &'static str {
    "hi"
}

async fn download() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/force-download")],
        Bytes::from_static(DOWNLOAD_BYTES),
    )
}

/// Reflects the raw query string so clients can assert their own encoding.
async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn protected() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, "no valid session")
}

async fn boom() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Answers far later than any client timeout used in tests, but soon enough
/// that a blocked transport thread does not stall test shutdown.
async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "finally"
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<EchoReply> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoReply {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}
