//! Credverify Identity Layer
//!
//! Resolves issuer and holder identifiers to verification keys:
//! - DID parsing and `did:web` URL derivation
//! - DID Documents (W3C DID Core JSON)
//! - DID resolution (`did:key`, `did:web`, composite)

pub mod did;
pub mod did_resolver;
pub mod document;
pub mod error;

pub use did::{did_web_url, Did};
pub use did_resolver::{CompositeDidResolver, DidKeyResolver, DidResolver, DidWebResolver};
pub use document::{DidDocument, VerificationMethod};
pub use error::IdentityError;
