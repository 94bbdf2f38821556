use credverify_core::CoreError;
use credverify_network::FetchError;
use credverify_proof::ProofError;

/// Verification pipeline errors. None of these reach a report directly;
/// each stage maps them onto the report's error names.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid status list: {0}")]
    StatusList(String),

    #[error("registry {name} unavailable: {message}")]
    Registry { name: String, message: String },

    #[error("schema {url} unusable: {message}")]
    Schema { url: String, message: String },

    #[error("presentation error: {0}")]
    Presentation(String),

    #[error("document error: {0}")]
    Document(#[from] CoreError),

    #[error("proof error: {0}")]
    Proof(#[from] ProofError),

    #[error("internal error: {0}")]
    Internal(String),
}
