use credverify_core::{Credential, ErrorName, VerificationError, VerificationStep};
use credverify_identity::{did_web_url, Did};
use credverify_proof::{RawError, RawOutcome, VerificationFailure};

pub const INVALID_SIGNATURE_MESSAGE: &str = "The signature is not valid.";
pub const UNKNOWN_ERROR_MESSAGE: &str =
    "An unknown error occurred while verifying the credential.";

/// A raw engine outcome sorted into "keep going" or "stop here".
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// The engine finished; the log is authoritative.
    Evaluated(Vec<VerificationStep>),
    /// The credential cannot be trusted.
    Fatal(VerificationError),
}

/// Map a raw engine outcome onto the report's error taxonomy.
pub fn classify(raw: RawOutcome, credential: &Credential) -> Classified {
    match raw.error {
        None => Classified::Evaluated(raw.log.unwrap_or_default()),
        Some(RawError::StepFailures { log }) => Classified::Evaluated(log),
        Some(RawError::Verification(failure)) => {
            Classified::Fatal(classify_failure(&failure, credential))
        }
        Some(RawError::Other {
            message,
            stack_trace,
        }) => {
            tracing::warn!(error = %message, "credential verification failed unexpectedly");
            let trace = match stack_trace {
                Some(trace) => format!("{}\n{}", message, trace),
                None => message,
            };
            Classified::Fatal(
                VerificationError::new(ErrorName::UnknownError, UNKNOWN_ERROR_MESSAGE)
                    .with_stack_trace(trace),
            )
        }
    }
}

fn classify_failure(failure: &VerificationFailure, credential: &Credential) -> VerificationError {
    let trace = failure
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    let Some(url) = failure.http_request_url() else {
        return VerificationError::new(ErrorName::InvalidSignature, INVALID_SIGNATURE_MESSAGE)
            .with_stack_trace(trace);
    };

    if issuer_did_web_url(credential).as_deref() == Some(url) {
        return VerificationError::new(
            ErrorName::DidWebUnresolved,
            format!(
                "The signature could not be checked because the public signing key could not be retrieved from {}",
                url
            ),
        )
        .with_stack_trace(trace);
    }

    VerificationError::new(
        ErrorName::HttpErrorWithSignatureCheck,
        format!(
            "An http error prevented the signature check. The request to {} failed.",
            url
        ),
    )
    .with_stack_trace(trace)
}

/// The `did.json` URL of a `did:web` issuer.
fn issuer_did_web_url(credential: &Credential) -> Option<String> {
    let issuer = credential.issuer_id()?;
    let did = Did::parse(&issuer).ok()?;
    if !did.is_web() {
        return None;
    }
    did_web_url(&did.to_string()).ok()
}
