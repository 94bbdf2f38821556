use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// A JSON-LD member that may hold a single value or an array of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(values) => values.is_empty(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(value) => std::slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
    }
}

impl<T: PartialEq> OneOrMany<T> {
    pub fn contains(&self, x: &T) -> bool {
        self.iter().any(|v| v == x)
    }
}

/// Credential issuer: a bare URI or an object carrying an `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    Uri(String),
    Object {
        id: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl Issuer {
    /// The issuer identifier, regardless of representation.
    pub fn id(&self) -> &str {
        match self {
            Self::Uri(uri) => uri,
            Self::Object { id, .. } => id,
        }
    }
}

/// A single proof entry attached to a credential or presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Members not modelled above (`@context`, `expires`, `jws`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proof {
    /// Short label used in logs, e.g. `DataIntegrityProof/eddsa-jcs-2022`.
    pub fn suite_label(&self) -> String {
        match &self.cryptosuite {
            Some(suite) => format!("{}/{}", self.proof_type, suite),
            None => self.proof_type.clone(),
        }
    }
}

/// Index into a status list; issuers encode it as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusListIndex {
    Number(u64),
    Text(String),
}

impl StatusListIndex {
    pub fn value(&self) -> Result<usize, CoreError> {
        match self {
            Self::Number(n) => {
                usize::try_from(*n).map_err(|_| CoreError::InvalidStatusIndex(n.to_string()))
            }
            Self::Text(s) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| CoreError::InvalidStatusIndex(s.clone())),
        }
    }
}

/// A `credentialStatus` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub status_type: OneOrMany<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_list_index: Option<StatusListIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_list_credential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_size: Option<u32>,
}

impl CredentialStatusEntry {
    /// The first declared type; the one status dispatch keys on.
    pub fn primary_type(&self) -> Option<&str> {
        self.status_type.first().map(String::as_str)
    }
}

/// A `credentialSchema` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchemaRef {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
}
