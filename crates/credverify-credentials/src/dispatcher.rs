//! Hands every configured proof suite to the proof engine and keeps
//! failures, including panics, inside the outcome.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use credverify_core::{Credential, Presentation};
use credverify_proof::{
    PresentationProofOptions, ProofEngine, ProofError, ProofSuite, RawError, RawOutcome,
    StatusCheck,
};
use futures::FutureExt;

/// Signature dispatcher.
#[derive(Clone)]
pub struct SignatureDispatcher {
    engine: Arc<dyn ProofEngine>,
    suites: Vec<Arc<dyn ProofSuite>>,
}

impl SignatureDispatcher {
    pub fn new(engine: Arc<dyn ProofEngine>, suites: Vec<Arc<dyn ProofSuite>>) -> Self {
        Self { engine, suites }
    }

    pub fn suites(&self) -> &[Arc<dyn ProofSuite>] {
        &self.suites
    }

    /// Verify a credential's proofs and, when a checker is given, its status.
    pub async fn verify(
        &self,
        credential: &Credential,
        status: Option<&dyn StatusCheck>,
    ) -> RawOutcome {
        let run = self.engine.verify_credential(credential, &self.suites, status);
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "proof engine panicked");
                RawOutcome {
                    verified: false,
                    log: None,
                    error: Some(RawError::Other {
                        message: "proof engine failure".to_string(),
                        stack_trace: Some(message),
                    }),
                }
            }
        }
    }

    /// Verify the holder proof of a presentation. A panic comes back as an
    /// internal proof error.
    pub async fn verify_presentation(
        &self,
        presentation: &Presentation,
        options: &PresentationProofOptions,
    ) -> Result<bool, ProofError> {
        let run = self
            .engine
            .verify_presentation(presentation, &self.suites, options);
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "proof engine panicked on presentation");
                Err(ProofError::MalformedProof(format!(
                    "proof engine failure: {}",
                    message
                )))
            }
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
