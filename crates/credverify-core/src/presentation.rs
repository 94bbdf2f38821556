use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credential::{self, Credential};
use crate::error::CoreError;
use crate::types::Proof;

/// A verifiable presentation envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Presentation(Value);

impl Presentation {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn has_context(&self) -> bool {
        credential::has_context(&self.0)
    }

    pub fn holder(&self) -> Option<&str> {
        match self.0.get("holder") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Object(obj)) => obj.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Embedded credentials in envelope order. A single object is treated
    /// as a one-element list; an absent member yields no credentials.
    pub fn credentials(&self) -> Result<Vec<Credential>, CoreError> {
        match self.0.get("verifiableCredential") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(obj @ Value::Object(_)) => Ok(vec![Credential::new(obj.clone())]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(_) => Ok(Credential::new(item.clone())),
                    other => Err(CoreError::MalformedDocument(format!(
                        "verifiableCredential entry is not an object: {}",
                        other
                    ))),
                })
                .collect(),
            Some(other) => Err(CoreError::MalformedDocument(format!(
                "verifiableCredential must be an object or array, got {}",
                other
            ))),
        }
    }

    pub fn has_proof(&self) -> bool {
        credential::has_proof(&self.0)
    }

    pub fn proofs(&self) -> Result<Vec<Proof>, CoreError> {
        credential::parse_proofs(&self.0)
    }

    pub fn without_proof(&self) -> Value {
        credential::without_proof(&self.0)
    }
}

impl From<Value> for Presentation {
    fn from(document: Value) -> Self {
        Self::new(document)
    }
}
