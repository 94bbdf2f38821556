/// Failures while retrieving a remote document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{url} not found")]
    NotFound { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("invalid response body from {url}: {message}")]
    InvalidBody { url: String, message: String },
}

impl FetchError {
    /// The URL of the failing request.
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url }
            | Self::Status { url, .. }
            | Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::InvalidBody { url, .. } => url,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the failure happened at the HTTP layer, as opposed to a
    /// response that arrived but could not be parsed.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::InvalidBody { .. })
    }
}
