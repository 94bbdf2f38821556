use credverify_core::VerificationStep;

use crate::error::ProofError;

/// What the proof engine reports for one credential.
///
/// `error` carries one of two unrelated things: the step log when a check
/// ran but failed, or the failure that stopped verification.
#[derive(Debug)]
pub struct RawOutcome {
    pub verified: bool,
    pub log: Option<Vec<VerificationStep>>,
    pub error: Option<RawError>,
}

#[derive(Debug)]
pub enum RawError {
    /// Verification completed; at least one step is not valid.
    StepFailures { log: Vec<VerificationStep> },
    /// A proof could not be verified.
    Verification(VerificationFailure),
    /// Anything else: malformed input, internal failure.
    Other {
        message: String,
        stack_trace: Option<String>,
    },
}

#[derive(Debug)]
pub struct VerificationFailure {
    pub message: String,
    pub errors: Vec<ProofError>,
}

impl VerificationFailure {
    /// URL of the first HTTP request whose failure caused this.
    pub fn http_request_url(&self) -> Option<&str> {
        self.errors.iter().find_map(ProofError::http_request_url)
    }

    /// Whether any underlying cause is an HTTP failure.
    pub fn has_http_cause(&self) -> bool {
        self.http_request_url().is_some()
    }
}

impl RawOutcome {
    /// Every step ran. Reported as verified only when every step is valid;
    /// otherwise the log moves into the error field.
    pub fn from_log(log: Vec<VerificationStep>) -> Self {
        if log.iter().all(VerificationStep::is_valid) {
            Self {
                verified: true,
                log: Some(log),
                error: None,
            }
        } else {
            Self {
                verified: false,
                log: None,
                error: Some(RawError::StepFailures { log }),
            }
        }
    }

    pub fn verification_failed(message: impl Into<String>, errors: Vec<ProofError>) -> Self {
        Self {
            verified: false,
            log: None,
            error: Some(RawError::Verification(VerificationFailure {
                message: message.into(),
                errors,
            })),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            verified: false,
            log: None,
            error: Some(RawError::Other {
                message: message.into(),
                stack_trace: None,
            }),
        }
    }
}
