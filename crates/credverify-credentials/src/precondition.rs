//! Structural checks that run before any cryptography.

use credverify_core::{Credential, ErrorName, VerificationError};

pub const INVALID_JSONLD_MESSAGE: &str =
    "The credential does not appear to be a valid jsonld document - there is no context.";
pub const NO_VC_CONTEXT_MESSAGE: &str =
    "The credential doesn't have a verifiable credential context.";
pub const INVALID_CREDENTIAL_ID_MESSAGE: &str = "The credential's id uses an invalid format. It may have been issued as part of an early pilot. Please contact the issuer to get a replacement.";
pub const NO_PROOF_MESSAGE: &str =
    "This is not a Verifiable Credential - it does not have a digital signature.";

/// Return the first structural problem that makes `credential` fatally
/// invalid, checking context, VC context, id and proof in that order.
pub fn check(credential: &Credential) -> Option<VerificationError> {
    if !credential.has_context() {
        return Some(VerificationError::new(
            ErrorName::InvalidJsonld,
            INVALID_JSONLD_MESSAGE,
        ));
    }
    if credential.version().is_none() {
        return Some(VerificationError::new(
            ErrorName::NoVcContext,
            NO_VC_CONTEXT_MESSAGE,
        ));
    }
    let id_is_uri = credential
        .id()
        .map(|id| url::Url::parse(id).is_ok())
        .unwrap_or(false);
    if !id_is_uri {
        return Some(VerificationError::new(
            ErrorName::InvalidCredentialId,
            INVALID_CREDENTIAL_ID_MESSAGE,
        ));
    }
    if !credential.has_proof() {
        return Some(VerificationError::new(ErrorName::NoProof, NO_PROOF_MESSAGE));
    }
    None
}
