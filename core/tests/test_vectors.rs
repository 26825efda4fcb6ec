//! Verify request shaping against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs and the request the fetcher must build
//! for them. Requests are captured with a recording transport; header
//! expectations are checked by case-insensitive lookup so incidental layer
//! ordering cannot produce false negatives.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fetcher_core::{
    normalize_message, CallOptions, FetchOutcome, Fetcher, FetcherConfig, HttpRequest,
    HttpResponse, Transport, TransportError,
};
use serde_json::json;

const BASE_URL: &str = "http://localhost:3000";

/// Records every request and answers 200 text/plain.
#[derive(Default)]
struct RecordingTransport {
    seen: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    fn last_request(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: b"ok".to_vec(),
        })
    }
}

fn string_pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (
                pair[0].as_str().unwrap().to_string(),
                pair[1].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[tokio::test]
async fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let query = string_pairs(&case["query"]);
        let query_refs: Vec<(&str, &str)> =
            query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let transport = Arc::new(RecordingTransport::default());
        let fetcher = Fetcher::new(FetcherConfig::new(BASE_URL), Arc::clone(&transport) as Arc<dyn Transport>);

        let outcome = fetcher
            .get(endpoint, &query_refs, &CallOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Text("ok".to_string()), "{name}");

        let expected_path = case["expected_path"].as_str().unwrap();
        assert_eq!(
            transport.last_request().url,
            format!("{BASE_URL}{expected_path}"),
            "{name}: url"
        );
    }
}

#[tokio::test]
async fn header_test_vectors() {
    let raw = include_str!("../../test-vectors/headers.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let defaults = string_pairs(&case["default_headers"]);
        let call_headers = string_pairs(&case["call_headers"]);

        let transport = Arc::new(RecordingTransport::default());
        let config = FetcherConfig::new(BASE_URL).with_default_headers(defaults);
        let fetcher = Fetcher::new(config, Arc::clone(&transport) as Arc<dyn Transport>);

        let opts = CallOptions {
            headers: call_headers,
            ..CallOptions::default()
        };
        fetcher
            .post("/items", Some(&json!({"a": 1})), &opts)
            .await
            .unwrap();

        let headers = transport.last_request().headers.expect("header set");
        for pair in case["expected"].as_array().unwrap() {
            let pair = pair.as_array().unwrap();
            let key = pair[0].as_str().unwrap();
            let value = pair[1].as_str().unwrap();
            assert_eq!(
                header_value(&headers, key),
                Some(value),
                "{name}: header {key}"
            );
        }
    }
}

#[test]
fn normalize_test_vectors() {
    let raw = include_str!("../../test-vectors/normalize.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = case["input"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();
        assert_eq!(normalize_message(input), expected, "{name}");
    }
}
