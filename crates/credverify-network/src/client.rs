use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use credverify_core::HttpConfig;

use crate::error::FetchError;
use crate::fetcher::HttpFetcher;

/// [`HttpFetcher`] backed by a shared `reqwest` client. Every request is
/// bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpClientFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClientFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: format!("error building HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(config.timeout_secs), &config.user_agent)
    }

    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/json, application/ld+json, application/jwt;q=0.9, */*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.bytes().await.map_err(|e| transport_error(url, e))
    }
}

#[async_trait]
impl HttpFetcher for HttpClientFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        tracing::debug!(url = %url, "fetching remote document");
        match tokio::time::timeout(self.timeout, self.get(url)).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => {
                tracing::debug!(url = %url, error = %e, "fetch failed");
                Err(e)
            }
            Err(_) => {
                tracing::debug!(url = %url, "fetch timed out");
                Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
        }
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
