//! Per-instance client configuration.
//!
//! # Design
//! `FetcherConfig` is assembled once, up front, and never mutated afterwards.
//! The `Fetcher` only reads it, so clones of a client can share request
//! defaults without any synchronization. The base URL is stored verbatim and
//! string-concatenated with each endpoint; callers own slash consistency.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout applied when none is configured or passed per call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Whether cookies and other ambient auth material accompany cross-origin
/// requests. Interpreted by the transport; carried here as plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialsMode {
    Omit,
    SameOrigin,
    Include,
}

impl CredentialsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialsMode::Omit => "omit",
            CredentialsMode::SameOrigin => "same-origin",
            CredentialsMode::Include => "include",
        }
    }
}

/// Request defaults shared by every call made through one `Fetcher`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    base_url: String,
    #[serde(default = "default_timeout")]
    default_timeout: Duration,
    #[serde(default)]
    default_headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials_mode: Option<CredentialsMode>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl FetcherConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            default_headers: Vec::new(),
            credentials_mode: None,
        }
    }

    /// Set the default timeout. A zero duration keeps the built-in default,
    /// so a config loaded with an unset or zeroed field behaves the same as
    /// one that never mentioned it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.default_timeout = timeout;
        }
        self
    }

    /// Headers attached to every call, ordered; later entries win when a
    /// key repeats. Per-call headers still override these.
    pub fn with_default_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn with_credentials_mode(mut self, mode: CredentialsMode) -> Self {
        self.credentials_mode = Some(mode);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub fn credentials_mode(&self) -> Option<CredentialsMode> {
        self.credentials_mode
    }
}
