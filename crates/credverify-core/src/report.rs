//! Verification report model.
//!
//! Reports serialize to the camelCase JSON shape wallets and verifier UIs
//! consume: a fatal report carries `errors`, an evaluated one carries the
//! step `log` and optional `additionalInformation`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RegistryKind;

pub const VALID_SIGNATURE_STEP_ID: &str = "valid_signature";
pub const EXPIRATION_STEP_ID: &str = "expiration";
pub const REVOCATION_STATUS_STEP_ID: &str = "revocation_status";
pub const REGISTERED_ISSUER_STEP_ID: &str = "registered_issuer";
pub const SCHEMA_CHECK_ID: &str = "schema_check";

/// One entry of the verification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStep {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_issuers: Option<Vec<MatchingIssuer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unchecked_registries: Option<Vec<UncheckedRegistry>>,
}

impl VerificationStep {
    /// A step with a boolean outcome.
    pub fn outcome(id: impl Into<String>, valid: bool) -> Self {
        Self {
            id: id.into(),
            valid: Some(valid),
            error: None,
            matching_issuers: None,
            unchecked_registries: None,
        }
    }

    pub fn passed(id: impl Into<String>) -> Self {
        Self::outcome(id, true)
    }

    /// A step that could not be evaluated.
    pub fn errored(id: impl Into<String>, error: StepError) -> Self {
        Self {
            id: id.into(),
            valid: None,
            error: Some(error),
            matching_issuers: None,
            unchecked_registries: None,
        }
    }

    /// The `registered_issuer` step for a completed registry lookup. Valid
    /// exactly when at least one registry lists the issuer.
    pub fn registered_issuer(lookup: RegistryLookup) -> Self {
        Self {
            id: REGISTERED_ISSUER_STEP_ID.to_string(),
            valid: Some(!lookup.matching_issuers.is_empty()),
            error: None,
            matching_issuers: Some(lookup.matching_issuers),
            unchecked_registries: Some(lookup.unchecked_registries),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }
}

/// Non-fatal step failure names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepErrorName {
    StatusListNotFound,
    StatusListInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepError {
    pub name: StepErrorName,
    pub message: String,
}

impl StepError {
    pub fn new(name: StepErrorName, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
        }
    }
}

/// Fatal error names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorName {
    InvalidJsonld,
    NoVcContext,
    InvalidCredentialId,
    NoProof,
    InvalidSignature,
    HttpErrorWithSignatureCheck,
    DidWebUnresolved,
    UnknownError,
    PresentationError,
}

impl ErrorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJsonld => "invalid_jsonld",
            Self::NoVcContext => "no_vc_context",
            Self::InvalidCredentialId => "invalid_credential_id",
            Self::NoProof => "no_proof",
            Self::InvalidSignature => "invalid_signature",
            Self::HttpErrorWithSignatureCheck => "http_error_with_signature_check",
            Self::DidWebUnresolved => "did_web_unresolved",
            Self::UnknownError => "unknown_error",
            Self::PresentationError => "presentation_error",
        }
    }
}

impl std::fmt::Display for ErrorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal verification error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationError {
    pub name: ErrorName,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl VerificationError {
    pub fn new(name: ErrorName, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
            stack_trace: None,
        }
    }

    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }
}

/// Registry reference echoed in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegistryKind,
    pub url: String,
}

/// A registry entry that lists the issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingIssuer {
    /// Issuer information as published by the registry.
    pub issuer: Value,
    pub registry: RegistryRef,
}

/// A configured registry that could not be consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncheckedRegistry {
    pub name: String,
    pub url: String,
}

/// Outcome of looking an issuer up across all configured registries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryLookup {
    pub matching_issuers: Vec<MatchingIssuer>,
    pub unchecked_registries: Vec<UncheckedRegistry>,
}

/// Where an applied schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaProvenance {
    Explicit,
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    pub instance_path: String,
    pub schema_path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<SchemaViolation>>,
}

impl SchemaValidation {
    pub fn from_violations(violations: Vec<SchemaViolation>) -> Self {
        if violations.is_empty() {
            Self {
                valid: true,
                errors: None,
            }
        } else {
            Self {
                valid: false,
                errors: Some(violations),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCheckResult {
    pub schema: String,
    pub provenance: SchemaProvenance,
    pub source: String,
    pub result: SchemaValidation,
}

/// Whole-credential schema outcome when no per-schema result applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaSentinel {
    #[serde(rename = "NO_SCHEMA")]
    NoSchema,
    #[serde(rename = "INVALID_SCHEMA")]
    InvalidSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaResults {
    Checked(Vec<SchemaCheckResult>),
    Sentinel(SchemaSentinel),
}

/// Informational block appended after the step log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInformation {
    pub id: String,
    pub results: SchemaResults,
}

impl AdditionalInformation {
    pub fn schema_check(results: SchemaResults) -> Self {
        Self {
            id: SCHEMA_CHECK_ID.to_string(),
            results,
        }
    }
}

/// Report for a single credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationResponse {
    /// Verification stopped; the credential must not be trusted.
    Fatal {
        credential: Value,
        errors: Vec<VerificationError>,
    },
    /// Every step ran; the log is authoritative.
    Evaluated {
        credential: Value,
        log: Vec<VerificationStep>,
        #[serde(
            rename = "additionalInformation",
            default,
            skip_serializing_if = "Vec::is_empty"
        )]
        additional_information: Vec<AdditionalInformation>,
    },
}

impl VerificationResponse {
    pub fn fatal(credential: Value, error: VerificationError) -> Self {
        Self::Fatal {
            credential,
            errors: vec![error],
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    pub fn credential(&self) -> &Value {
        match self {
            Self::Fatal { credential, .. } | Self::Evaluated { credential, .. } => credential,
        }
    }

    pub fn errors(&self) -> &[VerificationError] {
        match self {
            Self::Fatal { errors, .. } => errors,
            Self::Evaluated { .. } => &[],
        }
    }

    pub fn log(&self) -> &[VerificationStep] {
        match self {
            Self::Fatal { .. } => &[],
            Self::Evaluated { log, .. } => log,
        }
    }

    pub fn step(&self, id: &str) -> Option<&VerificationStep> {
        self.log().iter().find(|step| step.id == id)
    }

    pub fn schema_results(&self) -> Option<&SchemaResults> {
        match self {
            Self::Evaluated {
                additional_information,
                ..
            } => additional_information
                .iter()
                .find(|info| info.id == SCHEMA_CHECK_ID)
                .map(|info| &info.results),
            Self::Fatal { .. } => None,
        }
    }

    /// True when evaluated and every logged step is valid.
    pub fn all_steps_valid(&self) -> bool {
        match self {
            Self::Fatal { .. } => false,
            Self::Evaluated { log, .. } => log.iter().all(VerificationStep::is_valid),
        }
    }
}

/// Holder signature outcome of a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationSignature {
    Valid,
    Invalid,
    Unsigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationResult {
    pub signature: PresentationSignature,
}

/// Report for a presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresentationVerificationResponse {
    Evaluated {
        #[serde(rename = "presentationResult")]
        presentation_result: PresentationResult,
        #[serde(rename = "credentialResults")]
        credential_results: Vec<VerificationResponse>,
    },
    Fatal {
        errors: Vec<VerificationError>,
    },
}

impl PresentationVerificationResponse {
    pub fn presentation_error(message: impl Into<String>) -> Self {
        Self::Fatal {
            errors: vec![VerificationError::new(ErrorName::PresentationError, message)],
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    pub fn signature(&self) -> Option<PresentationSignature> {
        match self {
            Self::Evaluated {
                presentation_result,
                ..
            } => Some(presentation_result.signature),
            Self::Fatal { .. } => None,
        }
    }

    pub fn credential_results(&self) -> &[VerificationResponse] {
        match self {
            Self::Evaluated {
                credential_results, ..
            } => credential_results,
            Self::Fatal { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fatal_response_shape() {
        let response = VerificationResponse::fatal(
            json!({"id": "urn:uuid:1"}),
            VerificationError::new(ErrorName::NoProof, "no proof"),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["errors"][0]["name"], "no_proof");
        assert!(value.get("log").is_none());
        assert!(value["errors"][0].get("stackTrace").is_none());
        assert!(response.is_fatal());
        assert!(!response.all_steps_valid());
    }

    #[test]
    fn test_evaluated_response_shape() {
        let response = VerificationResponse::Evaluated {
            credential: json!({}),
            log: vec![
                VerificationStep::passed(VALID_SIGNATURE_STEP_ID),
                VerificationStep::outcome(EXPIRATION_STEP_ID, false),
            ],
            additional_information: vec![],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("errors").is_none());
        assert!(value.get("additionalInformation").is_none());
        assert_eq!(value["log"][1], json!({"id": "expiration", "valid": false}));
        assert_eq!(response.step(EXPIRATION_STEP_ID).unwrap().valid, Some(false));
        assert!(!response.all_steps_valid());
    }

    #[test]
    fn test_errored_step_shape() {
        let step = VerificationStep::errored(
            REVOCATION_STATUS_STEP_ID,
            StepError::new(StepErrorName::StatusListNotFound, "gone"),
        );
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(
            value,
            json!({"id": "revocation_status", "error": {"name": "status_list_not_found", "message": "gone"}})
        );
    }

    #[test]
    fn test_registered_issuer_step() {
        let unmatched = VerificationStep::registered_issuer(RegistryLookup {
            matching_issuers: vec![],
            unchecked_registries: vec![UncheckedRegistry {
                name: "Down".into(),
                url: "https://example.com/down.json".into(),
            }],
        });
        assert_eq!(unmatched.valid, Some(false));

        let matched = VerificationStep::registered_issuer(RegistryLookup {
            matching_issuers: vec![MatchingIssuer {
                issuer: json!({"name": "Example University"}),
                registry: RegistryRef {
                    name: "Sandbox".into(),
                    kind: RegistryKind::DccLegacy,
                    url: "https://example.com/registry.json".into(),
                },
            }],
            unchecked_registries: vec![],
        });
        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["matchingIssuers"][0]["registry"]["type"], "dcc-legacy");
        assert_eq!(value["uncheckedRegistries"], json!([]));
    }

    #[test]
    fn test_schema_results_shapes() {
        let sentinel = serde_json::to_value(SchemaResults::Sentinel(SchemaSentinel::NoSchema)).unwrap();
        assert_eq!(sentinel, json!("NO_SCHEMA"));

        let checked = SchemaResults::Checked(vec![SchemaCheckResult {
            schema: "https://example.com/schema.json".into(),
            provenance: SchemaProvenance::Explicit,
            source: "Specified in vc.credentialSchema".into(),
            result: SchemaValidation::from_violations(vec![]),
        }]);
        let value = serde_json::to_value(AdditionalInformation::schema_check(checked)).unwrap();
        assert_eq!(value["id"], "schema_check");
        assert_eq!(value["results"][0]["provenance"], "explicit");
        assert_eq!(value["results"][0]["result"], json!({"valid": true}));
    }

    #[test]
    fn test_presentation_response_shapes() {
        let evaluated = PresentationVerificationResponse::Evaluated {
            presentation_result: PresentationResult {
                signature: PresentationSignature::Unsigned,
            },
            credential_results: vec![],
        };
        let value = serde_json::to_value(&evaluated).unwrap();
        assert_eq!(value["presentationResult"]["signature"], "unsigned");
        assert_eq!(value["credentialResults"], json!([]));

        let fatal = PresentationVerificationResponse::presentation_error("broken");
        let value = serde_json::to_value(&fatal).unwrap();
        assert_eq!(value["errors"][0]["name"], "presentation_error");
        assert!(fatal.signature().is_none());
    }

    #[test]
    fn test_error_name_display() {
        assert_eq!(ErrorName::DidWebUnresolved.to_string(), "did_web_unresolved");
        let encoded = serde_json::to_value(ErrorName::HttpErrorWithSignatureCheck).unwrap();
        assert_eq!(encoded, json!("http_error_with_signature_check"));
    }
}
