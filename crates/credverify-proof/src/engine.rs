use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use credverify_core::report::{
    EXPIRATION_STEP_ID, REVOCATION_STATUS_STEP_ID, VALID_SIGNATURE_STEP_ID,
};
use credverify_core::{Credential, Presentation, Proof, VerificationStep};
use credverify_identity::{Did, DidResolver};
use serde_json::Value;

use crate::error::ProofError;
use crate::outcome::RawOutcome;
use crate::status::{StatusCheck, StatusOutcome};
use crate::suite::ProofSuite;

pub const ASSERTION_METHOD: &str = "assertionMethod";
pub const AUTHENTICATION: &str = "authentication";

/// Holder-binding options for presentation proofs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationProofOptions {
    pub challenge: Option<String>,
    pub domain: Option<String>,
}

/// Runs proof suites over credentials and presentations.
#[async_trait]
pub trait ProofEngine: Send + Sync {
    /// Verify a credential's proofs, validity period and (when a checker
    /// is supplied) status. Never fails; every problem is in the outcome.
    async fn verify_credential(
        &self,
        credential: &Credential,
        suites: &[Arc<dyn ProofSuite>],
        status: Option<&dyn StatusCheck>,
    ) -> RawOutcome;

    /// Verify a presentation's holder proof. `Ok(false)` means the proof
    /// is missing or does not verify; `Err` means the envelope is unusable.
    async fn verify_presentation(
        &self,
        presentation: &Presentation,
        suites: &[Arc<dyn ProofSuite>],
        options: &PresentationProofOptions,
    ) -> Result<bool, ProofError>;
}

/// What a proof must satisfy besides its signature.
struct Expectations<'a> {
    purpose: &'a str,
    controller: Option<&'a str>,
    challenge: Option<&'a str>,
    domain: Option<&'a str>,
}

/// [`ProofEngine`] for W3C Data Integrity proofs, resolving keys through
/// a [`DidResolver`].
pub struct DataIntegrityEngine {
    resolver: Arc<dyn DidResolver>,
}

impl DataIntegrityEngine {
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self { resolver }
    }

    /// Verify every proof some suite is responsible for. Proofs no suite
    /// matches are ignored, but at least one must match.
    async fn verify_proofs(
        &self,
        document: &Value,
        proofs: &[Proof],
        suites: &[Arc<dyn ProofSuite>],
        expect: &Expectations<'_>,
    ) -> Result<(), Vec<ProofError>> {
        let matched: Vec<(&Proof, &Arc<dyn ProofSuite>)> = proofs
            .iter()
            .filter_map(|proof| suites.iter().find(|s| s.matches(proof)).map(|s| (proof, s)))
            .collect();

        if matched.is_empty() {
            let found = proofs
                .iter()
                .map(Proof::suite_label)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(vec![ProofError::NoMatchingSuite(found)]);
        }
        if matched.len() < proofs.len() {
            tracing::debug!(
                matched = matched.len(),
                total = proofs.len(),
                "ignoring proofs without a configured suite"
            );
        }

        let mut errors = Vec::new();
        for (proof, suite) in matched {
            if let Err(e) = self.check_proof(document, proof, suite.as_ref(), expect).await {
                tracing::debug!(suite = %proof.suite_label(), error = %e, "proof rejected");
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    async fn check_proof(
        &self,
        document: &Value,
        proof: &Proof,
        suite: &dyn ProofSuite,
        expect: &Expectations<'_>,
    ) -> Result<(), ProofError> {
        let purpose = proof.proof_purpose.as_deref().unwrap_or_default();
        if purpose != expect.purpose {
            return Err(ProofError::PurposeMismatch {
                expected: expect.purpose.to_string(),
                actual: purpose.to_string(),
            });
        }

        if let Some(controller) = expect.controller {
            let method = proof
                .verification_method
                .as_deref()
                .ok_or_else(|| ProofError::MalformedProof("missing verificationMethod".into()))?;
            let method_did = Did::parse(method)?;
            if method_did.to_string() != controller {
                return Err(ProofError::ControllerMismatch {
                    method: method.to_string(),
                    expected: controller.to_string(),
                });
            }
        }

        check_binding("challenge", expect.challenge, proof.challenge.as_deref())?;
        check_binding("domain", expect.domain, proof.domain.as_deref())?;

        suite.verify_proof(document, proof, self.resolver.as_ref()).await
    }
}

fn check_binding(
    field: &'static str,
    expected: Option<&str>,
    actual: Option<&str>,
) -> Result<(), ProofError> {
    match expected {
        Some(wanted) if actual != Some(wanted) => Err(ProofError::BindingMismatch {
            field,
            expected: wanted.to_string(),
            actual: actual.map(str::to_string),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl ProofEngine for DataIntegrityEngine {
    async fn verify_credential(
        &self,
        credential: &Credential,
        suites: &[Arc<dyn ProofSuite>],
        status: Option<&dyn StatusCheck>,
    ) -> RawOutcome {
        if !credential.has_type(credverify_core::credential::BASE_CREDENTIAL_TYPE) {
            return RawOutcome::other("credential type must include \"VerifiableCredential\"");
        }
        let issuer = match credential.issuer_id() {
            Some(issuer) => issuer,
            None => return RawOutcome::other("credential has no issuer"),
        };
        if !credential.has_subject() {
            return RawOutcome::other("credential has no credentialSubject");
        }
        let proofs = match credential.proofs() {
            Ok(proofs) => proofs,
            Err(e) => return RawOutcome::other(e.to_string()),
        };
        let expired = match credential.is_expired_at(Utc::now()) {
            Ok(expired) => expired,
            Err(e) => return RawOutcome::other(e.to_string()),
        };

        let expect = Expectations {
            purpose: ASSERTION_METHOD,
            controller: Some(issuer.as_str()),
            challenge: None,
            domain: None,
        };
        if let Err(errors) = self
            .verify_proofs(credential.as_value(), &proofs, suites, &expect)
            .await
        {
            return RawOutcome::verification_failed("Verification error(s).", errors);
        }

        let mut log = vec![
            VerificationStep::passed(VALID_SIGNATURE_STEP_ID),
            VerificationStep::outcome(EXPIRATION_STEP_ID, !expired),
        ];
        if let (true, Some(checker)) = (credential.has_status(), status) {
            let step = match checker.check(credential).await {
                StatusOutcome::Checked { valid } => {
                    VerificationStep::outcome(REVOCATION_STATUS_STEP_ID, valid)
                }
                StatusOutcome::Unavailable(error) => {
                    VerificationStep::errored(REVOCATION_STATUS_STEP_ID, error)
                }
            };
            log.push(step);
        }

        RawOutcome::from_log(log)
    }

    async fn verify_presentation(
        &self,
        presentation: &Presentation,
        suites: &[Arc<dyn ProofSuite>],
        options: &PresentationProofOptions,
    ) -> Result<bool, ProofError> {
        let proofs = presentation.proofs()?;
        if proofs.is_empty() {
            tracing::debug!("presentation carries no proof");
            return Ok(false);
        }

        let holder = presentation.holder();
        let expect = Expectations {
            purpose: AUTHENTICATION,
            controller: holder,
            challenge: options.challenge.as_deref(),
            domain: options.domain.as_deref(),
        };
        match self
            .verify_proofs(presentation.as_value(), &proofs, suites, &expect)
            .await
        {
            Ok(()) => Ok(true),
            Err(errors) => {
                for e in &errors {
                    tracing::debug!(error = %e, "presentation proof rejected");
                }
                Ok(false)
            }
        }
    }
}
