//! Async REST client core over an abstract transport.
//!
//! # Overview
//! One `Fetcher` per remote service: it carries the base URL, default
//! timeout, default headers, and credentials mode, and exposes thin
//! `get`/`post`/`put`/`patch`/`delete` methods that all converge on a single
//! execution pipeline. The pipeline races the transport against the timeout,
//! classifies the response by content type (JSON, text, or forced download),
//! and funnels every failure through one normalization point.
//!
//! # Design
//! - The network lives behind the `Transport` trait; requests and responses
//!   cross it as plain data, so tests run against canned doubles and the
//!   workspace mock server equally well.
//! - The timeout is best-effort: a losing transport call is detached, never
//!   aborted, and its late result is discarded.
//! - Forced downloads are handed to a `FileSink` collaborator fire-and-forget.
//! - Calls share no mutable state; clone the `Fetcher` freely.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod sink;

pub use client::{CallOptions, FetchOutcome, Fetcher};
pub use config::{CredentialsMode, FetcherConfig, DEFAULT_TIMEOUT};
pub use error::{normalize_message, FetchError, UNAUTHORIZED_ERR_CODE};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use sink::{DirectorySink, FileSink, NullSink};
