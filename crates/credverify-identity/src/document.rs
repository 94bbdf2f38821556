use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credverify_crypto::PublicKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::IdentityError;

/// A verification method within a DID Document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Verification method identifier (e.g., "did:web:example.com#key-1").
    pub id: String,
    /// Type of the verification method (e.g., "Ed25519VerificationKey2020").
    #[serde(rename = "type")]
    pub method_type: String,
    /// The DID that controls this verification method.
    pub controller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Value>,
}

impl VerificationMethod {
    /// Build an Ed25519 multikey method for `key`, controlled by `controller`.
    pub fn ed25519(id: impl Into<String>, controller: impl Into<String>, key: &PublicKey) -> Self {
        Self {
            id: id.into(),
            method_type: "Ed25519VerificationKey2020".to_string(),
            controller: controller.into(),
            public_key_multibase: Some(key.to_multibase()),
            public_key_base58: None,
            public_key_jwk: None,
        }
    }

    /// Extract the Ed25519 public key from whichever encoding is present.
    pub fn public_key(&self) -> Result<PublicKey, IdentityError> {
        if let Some(multibase) = &self.public_key_multibase {
            return Ok(PublicKey::from_multibase(multibase)?);
        }
        if let Some(b58) = &self.public_key_base58 {
            let bytes = bs58_decode(b58)?;
            return Ok(PublicKey::from_bytes(&bytes)?);
        }
        if let Some(jwk) = &self.public_key_jwk {
            return jwk_public_key(jwk);
        }
        Err(IdentityError::MalformedDocument(format!(
            "verification method {} carries no supported key encoding",
            self.id
        )))
    }
}

/// W3C DID Document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// The DID subject.
    pub id: String,
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DidDocument {
    /// Create a document with a single Ed25519 method usable for both
    /// assertion and authentication.
    pub fn with_ed25519(id: impl Into<String>, vm_id: impl Into<String>, key: &PublicKey) -> Self {
        let id = id.into();
        let vm = VerificationMethod::ed25519(vm_id, id.clone(), key);
        let reference = Value::String(vm.id.clone());
        Self {
            context: Some(Value::Array(vec![
                Value::String("https://www.w3.org/ns/did/v1".into()),
                Value::String("https://w3id.org/security/suites/ed25519-2020/v1".into()),
            ])),
            id,
            verification_method: vec![vm],
            assertion_method: vec![reference.clone()],
            authentication: vec![reference],
            extra: Map::new(),
        }
    }

    /// Find a verification method by absolute id, relative id (`#key-1`)
    /// or bare fragment. Methods embedded in `assertionMethod` or
    /// `authentication` are searched too.
    pub fn find_method(&self, vm_id: &str) -> Option<VerificationMethod> {
        let fragment = vm_id.rsplit_once('#').map(|(_, f)| f);
        let matches = |candidate: &str| -> bool {
            if candidate == vm_id {
                return true;
            }
            match (candidate.rsplit_once('#'), fragment) {
                (Some((base, frag)), Some(wanted)) => {
                    frag == wanted && (base.is_empty() || base == self.id)
                }
                _ => false,
            }
        };

        self.verification_method
            .iter()
            .find(|vm| matches(&vm.id))
            .cloned()
            .or_else(|| {
                self.assertion_method
                    .iter()
                    .chain(self.authentication.iter())
                    .filter(|entry| entry.is_object())
                    .filter_map(|entry| {
                        serde_json::from_value::<VerificationMethod>(entry.clone()).ok()
                    })
                    .find(|vm| matches(&vm.id))
            })
    }

    /// Get the primary public key (first verification method).
    pub fn primary_public_key(&self) -> Result<PublicKey, IdentityError> {
        self.verification_method
            .first()
            .ok_or_else(|| IdentityError::VerificationMethodNotFound(self.id.clone()))?
            .public_key()
    }
}

fn bs58_decode(encoded: &str) -> Result<Vec<u8>, IdentityError> {
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| IdentityError::MalformedDocument(format!("invalid base58 key: {}", e)))
}

fn jwk_public_key(jwk: &Value) -> Result<PublicKey, IdentityError> {
    let kty = jwk.get("kty").and_then(Value::as_str);
    let crv = jwk.get("crv").and_then(Value::as_str);
    if kty != Some("OKP") || crv != Some("Ed25519") {
        return Err(IdentityError::MalformedDocument(format!(
            "unsupported JWK key type {:?}/{:?}",
            kty, crv
        )));
    }
    let x = jwk
        .get("x")
        .and_then(Value::as_str)
        .ok_or_else(|| IdentityError::MalformedDocument("JWK is missing \"x\"".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(x)
        .map_err(|e| IdentityError::MalformedDocument(format!("invalid JWK \"x\": {}", e)))?;
    Ok(PublicKey::from_bytes(&bytes)?)
}
