use credverify_crypto::CryptoError;
use credverify_network::FetchError;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unsupported DID method: {0}")]
    UnsupportedMethod(String),

    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("DID resolution failed: {0}")]
    DidResolution(String),

    #[error("could not retrieve key material from {url}: {source}")]
    KeyRetrieval {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("verification method not found: {0}")]
    VerificationMethodNotFound(String),

    #[error("malformed DID document: {0}")]
    MalformedDocument(String),

    #[error("invalid key: {0}")]
    InvalidKey(#[from] CryptoError),
}

impl IdentityError {
    /// URL of the HTTP request whose failure caused this error, if any.
    pub fn http_request_url(&self) -> Option<&str> {
        match self {
            Self::KeyRetrieval { url, source } if source.is_transport() => Some(url),
            _ => None,
        }
    }
}
