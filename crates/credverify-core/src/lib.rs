//! Credverify Core: Fundamental types, reports, errors, and configuration
//! for the credential verification pipeline.

pub mod config;
pub mod credential;
pub mod error;
pub mod presentation;
pub mod report;
pub mod types;

pub use config::{
    HttpConfig, LoggingConfig, RegistryConfig, RegistryKind, SchemaConfig, VerifierConfig,
};
pub use credential::{Credential, VcVersion, VC_V1_CONTEXT, VC_V2_CONTEXT};
pub use error::CoreError;
pub use presentation::Presentation;
pub use report::{
    AdditionalInformation, ErrorName, MatchingIssuer, PresentationResult,
    PresentationSignature, PresentationVerificationResponse, RegistryLookup, RegistryRef,
    SchemaCheckResult, SchemaProvenance, SchemaResults, SchemaSentinel, SchemaValidation,
    SchemaViolation, StepError, StepErrorName, UncheckedRegistry, VerificationError,
    VerificationResponse, VerificationStep,
};
pub use types::{CredentialSchemaRef, CredentialStatusEntry, Issuer, OneOrMany, Proof};
