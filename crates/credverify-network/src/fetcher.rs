use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::FetchError;

/// Retrieves remote documents by URL.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and return the raw response body.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;

    /// GET `url` and parse the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::InvalidBody {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET `url` and return the body as UTF-8 text.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch(url).await?;
        String::from_utf8(body.to_vec()).map_err(|e| FetchError::InvalidBody {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
