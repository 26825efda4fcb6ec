//! Request executor and verb-shaping layer.
//!
//! # Design
//! `Fetcher` holds read-only configuration plus two collaborators behind
//! `Arc<dyn _>`: the `Transport` that performs the round-trip and the
//! `FileSink` that receives forced downloads. Each public verb method shapes
//! its parameters into an `HttpRequest` and delegates to one private
//! pipeline: race the transport against the timeout, classify the settled
//! response by content type, and funnel every failure through a single
//! normalization point. Calls share no mutable state, so concurrent use
//! needs no coordination.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::FetcherConfig;
use crate::error::{FetchError, UNAUTHORIZED_ERR_CODE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::sink::{FileSink, NullSink};

const FORCE_DOWNLOAD_CONTENT_TYPE: &str = "application/force-download";

/// Decoded result of one successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response carried `application/json` (possibly with parameters).
    Json(serde_json::Value),
    /// Any other successful response, read as text.
    Text(String),
    /// An `application/force-download` response; the bytes were handed to
    /// the file sink without waiting for the save to finish.
    FileSaved,
}

impl FetchOutcome {
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            FetchOutcome::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            FetchOutcome::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Per-call overrides: an optional timeout (falls back to the configured
/// default) and headers merged over the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
}

/// REST client over an abstract transport.
#[derive(Clone)]
pub struct Fetcher {
    config: FetcherConfig,
    transport: Arc<dyn Transport>,
    file_sink: Arc<dyn FileSink>,
}

impl Fetcher {
    /// Build a client from configuration and a transport. Forced downloads
    /// are discarded until a sink is installed with [`with_file_sink`].
    ///
    /// [`with_file_sink`]: Fetcher::with_file_sink
    pub fn new(config: FetcherConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            file_sink: Arc::new(NullSink),
        }
    }

    pub fn with_file_sink(mut self, sink: Arc<dyn FileSink>) -> Self {
        self.file_sink = sink;
        self
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Send a GET request. Query values are percent-encoded and rendered in
    /// slice order; a header set is attached only when default or per-call
    /// headers exist, otherwise the transport is left to its own defaults.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        opts: &CallOptions,
    ) -> Result<FetchOutcome, FetchError> {
        let query_string = query
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let url = if query_string.is_empty() {
            format!("{}{endpoint}", self.config.base_url())
        } else {
            format!("{}{endpoint}?{query_string}", self.config.base_url())
        };

        let defaults = self.config.default_headers();
        let headers = if defaults.is_empty() && opts.headers.is_empty() {
            None
        } else {
            let mut merged = Vec::new();
            overlay(&mut merged, defaults);
            overlay(&mut merged, &opts.headers);
            Some(merged)
        };

        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            headers,
            body: None,
            credentials: None,
        };
        self.execute(endpoint, request, self.resolve_timeout(opts)).await
    }

    /// Send a POST request with an optional JSON body.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&T>,
        opts: &CallOptions,
    ) -> Result<FetchOutcome, FetchError> {
        self.call_rest(endpoint, HttpMethod::Post, body, opts).await
    }

    /// Send a PUT request with an optional JSON body.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&T>,
        opts: &CallOptions,
    ) -> Result<FetchOutcome, FetchError> {
        self.call_rest(endpoint, HttpMethod::Put, body, opts).await
    }

    /// Send a PATCH request with an optional JSON body.
    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&T>,
        opts: &CallOptions,
    ) -> Result<FetchOutcome, FetchError> {
        self.call_rest(endpoint, HttpMethod::Patch, body, opts).await
    }

    /// Send a DELETE request with an optional JSON body. Returns the decoded
    /// outcome like every other verb.
    pub async fn delete<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&T>,
        opts: &CallOptions,
    ) -> Result<FetchOutcome, FetchError> {
        self.call_rest(endpoint, HttpMethod::Delete, body, opts).await
    }

    /// Shared shaping for the body-bearing verbs: JSON body, required
    /// `Accept`/`Content-Type` headers under the configured and per-call
    /// ones, and a debug log of the outgoing request.
    async fn call_rest<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&T>,
        opts: &CallOptions,
    ) -> Result<FetchOutcome, FetchError> {
        let url = format!("{}{endpoint}", self.config.base_url());

        let body = match body {
            Some(value) => Some(
                serde_json::to_string(value)
                    .map_err(|err| FetchError::Serialization(err.to_string()))?,
            ),
            None => None,
        };

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        overlay(&mut headers, self.config.default_headers());
        overlay(&mut headers, &opts.headers);

        log::debug!("{} {endpoint}", method.as_str());

        let request = HttpRequest {
            method,
            url,
            headers: Some(headers),
            body,
            credentials: None,
        };
        self.execute(endpoint, request, self.resolve_timeout(opts)).await
    }

    fn resolve_timeout(&self, opts: &CallOptions) -> Duration {
        opts.timeout.unwrap_or(self.config.default_timeout())
    }

    /// The single execution pipeline: attach credentials, race the transport
    /// against the timeout, classify the response, and normalize failures.
    async fn execute(
        &self,
        endpoint: &str,
        mut request: HttpRequest,
        timeout: Duration,
    ) -> Result<FetchOutcome, FetchError> {
        if let Some(mode) = self.config.credentials_mode() {
            request.credentials = Some(mode);
        }

        match self.dispatch(request, timeout).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let normalized = err.clone().normalized();
                log::error!("error in {endpoint} API: {normalized} ({err:?})");
                Err(normalized)
            }
        }
    }

    /// Race the transport against the timeout. The transport runs on its own
    /// task, so losing the race leaves it to finish detached; only its
    /// result is abandoned. A response settling after the timer has fired is
    /// discarded, never reported as success.
    async fn dispatch(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<FetchOutcome, FetchError> {
        let transport = Arc::clone(&self.transport);
        let call = tokio::spawn(async move { transport.send(request).await });

        let response = tokio::select! {
            joined = call => match joined {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => return Err(FetchError::Transport(err.to_string())),
                Err(err) => return Err(FetchError::Transport(err.to_string())),
            },
            _ = tokio::time::sleep(timeout) => return Err(FetchError::Timeout),
        };

        self.classify(response)
    }

    /// Decode a settled response by status and content type.
    fn classify(&self, response: HttpResponse) -> Result<FetchOutcome, FetchError> {
        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).into_owned();
            return Err(if response.status == UNAUTHORIZED_ERR_CODE {
                FetchError::Unauthorized { message }
            } else {
                FetchError::Http {
                    status: response.status,
                    message,
                }
            });
        }

        let content_type = response.header("Content-Type").unwrap_or("").to_string();

        if content_type == FORCE_DOWNLOAD_CONTENT_TYPE {
            let sink = Arc::clone(&self.file_sink);
            let bytes = response.body;
            // Fire and forget: the save runs detached, the caller only
            // learns that a download was triggered.
            tokio::spawn(async move { sink.save(bytes).await });
            Ok(FetchOutcome::FileSaved)
        } else if content_type.contains("application/json") {
            serde_json::from_slice(&response.body)
                .map(FetchOutcome::Json)
                .map_err(|err| FetchError::Deserialization(err.to_string()))
        } else {
            Ok(FetchOutcome::Text(
                String::from_utf8_lossy(&response.body).into_owned(),
            ))
        }
    }
}

/// Merge one header layer over `target`: keys collide case-insensitively,
/// the incoming value wins, first-seen key spelling and order are kept.
fn overlay(target: &mut Vec<(String, String)>, layer: &[(String, String)]) {
    for (key, value) in layer {
        match target
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value.clone(),
            None => target.push((key.clone(), value.clone())),
        }
    }
}
