//! File-persistence collaborator for forced-download responses.
//!
//! # Design
//! The executor hands download bytes to a `FileSink` on a detached task and
//! never awaits the save, so a slow disk cannot stall the caller. Sinks
//! report nothing back; failures are logged and dropped.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

/// Receives the body of an `application/force-download` response.
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn save(&self, bytes: Vec<u8>);
}

/// Default sink: discards the payload with a warning. Installed until the
/// caller picks a destination via `Fetcher::with_file_sink`.
pub struct NullSink;

#[async_trait]
impl FileSink for NullSink {
    async fn save(&self, bytes: Vec<u8>) {
        log::warn!("discarding {}-byte download: no file sink configured", bytes.len());
    }
}

/// Writes each payload to a fresh `download-N` file in one directory. The
/// server supplies no filename hint, so a per-instance counter names the
/// files the way a browser deduplicates unnamed downloads.
pub struct DirectorySink {
    dir: PathBuf,
    counter: AtomicU64,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, bytes: Vec<u8>) {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("download-{n}"));
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => log::debug!("saved {}-byte download to {}", bytes.len(), path.display()),
            Err(err) => log::error!("failed to save download to {}: {err}", path.display()),
        }
    }
}
