//! Credverify Crypto: Ed25519 keys and signatures, multibase key
//! encoding, and the SHA-256 / JCS digests used by proof suites.

pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{canonicalize, canonical_digest, sha256, Digest};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
