//! Read-only view over a credential document.
//!
//! A credential is kept as the JSON document it arrived as. Members the
//! pipeline does not understand are preserved untouched and echoed back in
//! the verification report; typed accessors parse only what a check needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::{CredentialSchemaRef, CredentialStatusEntry, Issuer, OneOrMany, Proof};

/// W3C VC Data Model 1.1 base context.
pub const VC_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
/// W3C VC Data Model 2.0 base context.
pub const VC_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";
/// Type every credential must declare.
pub const BASE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// VC Data Model version a credential is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcVersion {
    V1,
    V2,
}

impl VcVersion {
    pub fn number(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

/// A verifiable credential document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(Value);

impl Credential {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Whether `@context` is present and non-empty.
    pub fn has_context(&self) -> bool {
        has_context(&self.0)
    }

    /// String entries of `@context`, in document order. Inline context
    /// objects are skipped.
    pub fn context_uris(&self) -> Vec<&str> {
        context_uris(&self.0)
    }

    /// The data model version, if a base VC context is declared.
    pub fn version(&self) -> Option<VcVersion> {
        let contexts = self.context_uris();
        if contexts.contains(&VC_V2_CONTEXT) {
            Some(VcVersion::V2)
        } else if contexts.contains(&VC_V1_CONTEXT) {
            Some(VcVersion::V1)
        } else {
            None
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn types(&self) -> Vec<&str> {
        string_or_strings(self.0.get("type"))
    }

    pub fn has_type(&self, wanted: &str) -> bool {
        self.types().contains(&wanted)
    }

    pub fn issuer(&self) -> Option<Issuer> {
        self.0
            .get("issuer")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn issuer_id(&self) -> Option<String> {
        self.issuer().map(|issuer| issuer.id().to_string())
    }

    pub fn has_subject(&self) -> bool {
        matches!(
            self.0.get("credentialSubject"),
            Some(Value::Object(_)) | Some(Value::Array(_))
        )
    }

    /// Whether at least one proof entry is attached.
    pub fn has_proof(&self) -> bool {
        has_proof(&self.0)
    }

    /// All attached proofs. Absent `proof` yields an empty list.
    pub fn proofs(&self) -> Result<Vec<Proof>, CoreError> {
        parse_proofs(&self.0)
    }

    /// The document with its `proof` member removed.
    pub fn without_proof(&self) -> Value {
        without_proof(&self.0)
    }

    pub fn has_status(&self) -> bool {
        !matches!(self.0.get("credentialStatus"), None | Some(Value::Null))
    }

    /// All `credentialStatus` entries, in document order.
    pub fn status_entries(&self) -> Result<Vec<CredentialStatusEntry>, CoreError> {
        match self.0.get("credentialStatus") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => {
                let entries: OneOrMany<CredentialStatusEntry> =
                    serde_json::from_value(value.clone()).map_err(|e| {
                        CoreError::MalformedDocument(format!("credentialStatus: {}", e))
                    })?;
                Ok(entries.into_vec())
            }
        }
    }

    /// The first `credentialStatus` entry; the one status dispatch keys on.
    pub fn primary_status(&self) -> Result<Option<CredentialStatusEntry>, CoreError> {
        Ok(self.status_entries()?.into_iter().next())
    }

    pub fn has_schema(&self) -> bool {
        !matches!(self.0.get("credentialSchema"), None | Some(Value::Null))
    }

    /// All `credentialSchema` references, a single object wrapped into a list.
    pub fn schema_refs(&self) -> Result<Vec<CredentialSchemaRef>, CoreError> {
        match self.0.get("credentialSchema") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => {
                let refs: OneOrMany<CredentialSchemaRef> = serde_json::from_value(value.clone())
                    .map_err(|e| {
                        CoreError::MalformedDocument(format!("credentialSchema: {}", e))
                    })?;
                Ok(refs.into_vec())
            }
        }
    }

    /// End of the validity period: `validUntil` (v2) or `expirationDate` (v1).
    pub fn valid_until(&self) -> Result<Option<DateTime<Utc>>, CoreError> {
        for field in ["validUntil", "expirationDate"] {
            if let Some(value) = self.0.get(field) {
                return parse_date(field, value).map(Some);
            }
        }
        Ok(None)
    }

    /// Whether the validity period ended before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> Result<bool, CoreError> {
        Ok(self.valid_until()?.map(|end| end < now).unwrap_or(false))
    }
}

impl From<Value> for Credential {
    fn from(document: Value) -> Self {
        Self::new(document)
    }
}

pub(crate) fn has_context(document: &Value) -> bool {
    match document.get("@context") {
        None | Some(Value::Null) => false,
        Some(Value::Array(entries)) => !entries.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Object(_)) => true,
        Some(_) => false,
    }
}

pub(crate) fn context_uris(document: &Value) -> Vec<&str> {
    match document.get("@context") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(entries)) => entries.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn has_proof(document: &Value) -> bool {
    match document.get("proof") {
        None | Some(Value::Null) => false,
        Some(Value::Array(proofs)) => !proofs.is_empty(),
        Some(_) => true,
    }
}

pub(crate) fn parse_proofs(document: &Value) -> Result<Vec<Proof>, CoreError> {
    match document.get("proof") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => {
            let proofs: OneOrMany<Proof> = serde_json::from_value(value.clone())
                .map_err(|e| CoreError::MalformedDocument(format!("proof: {}", e)))?;
            Ok(proofs.into_vec())
        }
    }
}

pub(crate) fn without_proof(document: &Value) -> Value {
    let mut unsecured = document.clone();
    if let Some(obj) = unsecured.as_object_mut() {
        obj.remove("proof");
    }
    unsecured
}

fn string_or_strings(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn parse_date(field: &str, value: &Value) -> Result<DateTime<Utc>, CoreError> {
    let invalid = || CoreError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    };
    let text = value.as_str().ok_or_else(invalid)?;
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| invalid())
}
