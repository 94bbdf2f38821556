use credverify_core::CoreError;
use credverify_crypto::CryptoError;
use credverify_identity::IdentityError;

/// Proof verification errors.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("no proof matched a configured suite (found: {0})")]
    NoMatchingSuite(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("proof purpose mismatch: expected {expected}, got {actual}")]
    PurposeMismatch { expected: String, actual: String },

    #[error("verification method {method} is not controlled by {expected}")]
    ControllerMismatch { method: String, expected: String },

    #[error("{field} mismatch: expected {expected:?}, got {actual:?}")]
    BindingMismatch {
        field: &'static str,
        expected: String,
        actual: Option<String>,
    },

    #[error("signature verification failed for {0}")]
    InvalidSignature(String),

    #[error("key resolution failed: {0}")]
    KeyResolution(#[from] IdentityError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("document error: {0}")]
    Document(#[from] CoreError),
}

impl ProofError {
    /// URL of the HTTP request whose failure caused this error, if any.
    pub fn http_request_url(&self) -> Option<&str> {
        match self {
            Self::KeyResolution(e) => e.http_request_url(),
            _ => None,
        }
    }
}
