use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::error::CryptoError;

/// Multicodec varint prefix for an Ed25519 public key (0xed).
const ED25519_PUB_MULTICODEC: [u8; 2] = [0xed, 0x01];
/// Multibase prefix for base58btc.
const BASE58BTC_PREFIX: char = 'z';

/// Ed25519 key pair for signing operations.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Decode a `publicKeyMultibase` value: base58btc over the Ed25519
    /// multicodec prefix and the raw key.
    pub fn from_multibase(encoded: &str) -> Result<Self, CryptoError> {
        let mut chars = encoded.chars();
        match chars.next() {
            Some(BASE58BTC_PREFIX) => {}
            other => return Err(CryptoError::UnsupportedMultibase(other)),
        }
        let bytes = bs58::decode(chars.as_str())
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))?;
        match bytes.strip_prefix(&ED25519_PUB_MULTICODEC[..]) {
            Some(raw) => Self::from_bytes(raw),
            None => Err(CryptoError::UnsupportedKeyType(format!(
                "{:02x?}",
                &bytes[..bytes.len().min(2)]
            ))),
        }
    }

    /// Encode as `publicKeyMultibase`.
    pub fn to_multibase(&self) -> String {
        let mut prefixed = Vec::with_capacity(34);
        prefixed.extend_from_slice(&ED25519_PUB_MULTICODEC);
        prefixed.extend_from_slice(self.as_bytes());
        format!("{}{}", BASE58BTC_PREFIX, bs58::encode(prefixed).into_string())
    }

    /// The `did:key` identifier for this key.
    pub fn did_key(&self) -> String {
        format!("did:key:{}", self.to_multibase())
    }

    /// The `did:key` verification method URL for this key.
    pub fn did_key_vm(&self) -> String {
        let multibase = self.to_multibase();
        format!("did:key:{}#{}", multibase, multibase)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
