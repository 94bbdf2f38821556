use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::FetchError;
use crate::fetcher::HttpFetcher;

#[derive(Debug, Clone)]
enum Entry {
    Body(Bytes),
    Failure(FetchError),
}

/// In-memory [`HttpFetcher`] serving pre-registered documents.
///
/// Unregistered URLs answer [`FetchError::NotFound`]. Used for offline
/// verification and tests.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    entries: DashMap<String, Entry>,
    requests: DashMap<String, usize>,
    total: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Bytes>) {
        self.entries.insert(url.into(), Entry::Body(body.into()));
    }

    /// Serve `value` as JSON at `url`.
    pub fn insert_json(&self, url: impl Into<String>, value: &Value) {
        self.insert(url, value.to_string());
    }

    /// Answer requests for `url` with `error`.
    pub fn fail(&self, url: impl Into<String>, error: FetchError) {
        self.entries.insert(url.into(), Entry::Failure(error));
    }

    pub fn remove(&self, url: &str) {
        self.entries.remove(url);
    }

    /// Number of requests made for `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.get(url).map(|count| *count).unwrap_or(0)
    }

    /// Number of requests made for any URL.
    pub fn total_requests(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HttpFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        *self.requests.entry(url.to_string()).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::Relaxed);

        let entry = self.entries.get(url).map(|e| e.value().clone());
        match entry {
            Some(Entry::Body(body)) => Ok(body),
            Some(Entry::Failure(e)) => Err(e),
            None => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
        }
    }
}
