use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use credverify_core::{
    Credential, Presentation, PresentationResult, PresentationSignature,
    PresentationVerificationResponse, RegistryConfig,
};
use credverify_proof::PresentationProofOptions;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;

use crate::dispatcher::panic_message;
use crate::error::CredentialError;
use crate::status::StatusChecker;
use crate::verifier::CredentialVerifier;

/// Options for [`PresentationVerifier::verify_presentation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationOptions {
    /// Expected `challenge` of the holder proof.
    pub challenge: Option<String>,
    /// Expected `domain` of the holder proof.
    pub domain: Option<String>,
    /// Skip the holder proof and report the presentation as unsigned.
    pub unsigned: bool,
    pub reload_registries: bool,
}

/// Verifies a presentation envelope and every credential it carries.
#[derive(Clone)]
pub struct PresentationVerifier {
    credentials: Arc<CredentialVerifier>,
}

impl PresentationVerifier {
    pub fn new(credentials: Arc<CredentialVerifier>) -> Self {
        Self { credentials }
    }

    pub fn credential_verifier(&self) -> &Arc<CredentialVerifier> {
        &self.credentials
    }

    pub async fn verify_presentation(
        &self,
        presentation: impl Into<Value>,
        registries: &[RegistryConfig],
        options: &PresentationOptions,
    ) -> PresentationVerificationResponse {
        let presentation = Presentation::new(presentation.into());
        let run = self.run(&presentation, registries, options);
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::info!(error = %e, "presentation rejected");
                PresentationVerificationResponse::presentation_error(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "presentation verification panicked");
                PresentationVerificationResponse::presentation_error(message)
            }
        }
    }

    async fn run(
        &self,
        presentation: &Presentation,
        registries: &[RegistryConfig],
        options: &PresentationOptions,
    ) -> Result<PresentationVerificationResponse, CredentialError> {
        if !presentation.has_context() {
            return Err(CredentialError::Presentation(
                "The presentation does not appear to be a valid jsonld document - there is no context."
                    .into(),
            ));
        }
        let credentials = presentation
            .credentials()
            .map_err(|e| CredentialError::Presentation(e.to_string()))?;

        let checker = self.shared_status_checker(&credentials);

        let signature = if options.unsigned {
            PresentationSignature::Unsigned
        } else {
            let proof_options = PresentationProofOptions {
                challenge: options.challenge.clone(),
                domain: options.domain.clone(),
            };
            let verified = self
                .credentials
                .dispatcher()
                .verify_presentation(presentation, &proof_options)
                .await?;
            if verified {
                PresentationSignature::Valid
            } else {
                PresentationSignature::Invalid
            }
        };

        if options.reload_registries {
            self.credentials.registry_cache().reload(registries).await;
        }

        let credential_results = join_all(credentials.into_iter().map(|credential| {
            self.credentials
                .verify_with_status(credential, registries, checker.as_ref())
        }))
        .await;

        tracing::info!(
            signature = ?signature,
            credentials = credential_results.len(),
            "presentation verified"
        );
        Ok(PresentationVerificationResponse::Evaluated {
            presentation_result: PresentationResult { signature },
            credential_results,
        })
    }

    /// The status checker of the first credential that declares a status,
    /// used for every credential in the presentation.
    fn shared_status_checker(&self, credentials: &[Credential]) -> Option<StatusChecker> {
        let resolver = self.credentials.status_resolver();
        let first = credentials.iter().find(|c| c.has_status())?;
        let checker = resolver.select_checker(first)?;
        for other in credentials.iter().filter(|c| c.has_status()) {
            let kind = resolver.select_checker(other).map(|c| c.kind());
            if kind != Some(checker.kind()) {
                tracing::warn!(
                    id = ?other.id(),
                    shared = checker.kind(),
                    declared = ?kind,
                    "credential status type differs from the presentation's shared status checker"
                );
            }
        }
        Some(checker)
    }
}
