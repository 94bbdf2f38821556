use serde_json::Value;
use sha2::Sha256;

use crate::error::CryptoError;

/// SHA-256 digest (32 bytes).
pub type Digest = [u8; 32];

/// Hash arbitrary data using SHA-256.
pub fn sha256(data: &[u8]) -> Digest {
    use sha2::Digest as _;
    Sha256::digest(data).into()
}

/// Serialize a JSON value per the JSON Canonicalization Scheme (RFC 8785).
pub fn canonicalize(value: &Value) -> Result<Vec<u8>, CryptoError> {
    serde_jcs::to_vec(value).map_err(|e| CryptoError::Canonicalization(e.to_string()))
}

/// SHA-256 over the JCS form of a JSON value.
pub fn canonical_digest(value: &Value) -> Result<Digest, CryptoError> {
    Ok(sha256(&canonicalize(value)?))
}
