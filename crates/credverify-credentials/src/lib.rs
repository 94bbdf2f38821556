//! Credverify Credentials: the verification pipeline.
//!
//! A credential passes through structural preconditions, signature and
//! status checks, error classification, trust registry lookup and schema
//! conformance, producing a [`credverify_core::VerificationResponse`].
//! Presentations add a holder proof and verify each embedded credential.

pub mod classifier;
pub mod dispatcher;
pub mod error;
pub mod federation;
pub mod precondition;
pub mod presentation;
pub mod registry;
pub mod schema;
pub mod status;
pub mod verifier;

pub use classifier::{classify, Classified};
pub use dispatcher::SignatureDispatcher;
pub use error::CredentialError;
pub use federation::TrustAnchor;
pub use presentation::{PresentationOptions, PresentationVerifier};
pub use registry::{LoadedRegistries, RegistryCache};
pub use schema::{CompiledSchema, JsonSchemaValidator, SchemaResolver, SchemaValidator};
pub use status::{StatusChecker, StatusMechanism, StatusResolver};
pub use verifier::{CredentialVerifier, CredentialVerifierBuilder, VerifyOptions};
