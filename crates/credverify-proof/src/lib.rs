//! Credverify Proof: cryptographic proof verification for credentials
//! and presentations.
//!
//! - [`ProofSuite`]: one proof type (and cryptosuite) a verifier accepts
//! - [`EddsaJcs2022`]: `DataIntegrityProof` / `eddsa-jcs-2022`
//! - [`ProofEngine`]: runs suites over a document and reports a
//!   [`RawOutcome`] with its step log
//! - [`StatusCheck`]: hook through which the engine asks for revocation status

pub mod eddsa_jcs;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod status;
pub mod suite;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use eddsa_jcs::EddsaJcs2022;
pub use engine::{DataIntegrityEngine, PresentationProofOptions, ProofEngine};
pub use error::ProofError;
pub use outcome::{RawError, RawOutcome, VerificationFailure};
pub use status::{StatusCheck, StatusOutcome};
pub use suite::ProofSuite;
