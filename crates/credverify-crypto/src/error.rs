/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid signature length: expected 64, got {0}")]
    InvalidSignatureLength(usize),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("unsupported multibase prefix: {0:?}")]
    UnsupportedMultibase(Option<char>),

    #[error("unsupported multicodec key type: {0}")]
    UnsupportedKeyType(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
