//! Signing helpers for building test fixtures.
//!
//! Only compiled for tests and with the `test-utils` feature; the verifier
//! never signs anything.

use credverify_core::Proof;
use credverify_crypto::{sign, KeyPair};
use serde_json::{Map, Value};

use crate::eddsa_jcs::{EddsaJcs2022, DATA_INTEGRITY_PROOF, EDDSA_JCS_2022};

/// Proof options for [`sign_document_with`].
#[derive(Debug, Clone)]
pub struct ProofOptions {
    pub verification_method: String,
    pub proof_purpose: String,
    pub created: String,
    pub challenge: Option<String>,
    pub domain: Option<String>,
}

impl ProofOptions {
    /// Options for a `did:key` signer.
    pub fn did_key(keypair: &KeyPair, proof_purpose: &str) -> Self {
        Self {
            verification_method: keypair.public_key().did_key_vm(),
            proof_purpose: proof_purpose.to_string(),
            created: "2024-01-01T00:00:00Z".to_string(),
            challenge: None,
            domain: None,
        }
    }
}

/// Sign `document` with an `eddsa-jcs-2022` proof from a `did:key` signer.
pub fn sign_document(document: &Value, keypair: &KeyPair, proof_purpose: &str) -> Value {
    sign_document_with(document, keypair, &ProofOptions::did_key(keypair, proof_purpose))
}

/// Sign `document` with an `eddsa-jcs-2022` proof. An existing proof is
/// kept and the new one appended, producing a proof set.
pub fn sign_document_with(document: &Value, keypair: &KeyPair, options: &ProofOptions) -> Value {
    let mut proof = Proof {
        proof_type: DATA_INTEGRITY_PROOF.to_string(),
        cryptosuite: Some(EDDSA_JCS_2022.to_string()),
        created: Some(options.created.clone()),
        verification_method: Some(options.verification_method.clone()),
        proof_purpose: Some(options.proof_purpose.clone()),
        proof_value: None,
        challenge: options.challenge.clone(),
        domain: options.domain.clone(),
        extra: Map::new(),
    };
    let message = EddsaJcs2022::signing_input(document, &proof).expect("signing input");
    proof.proof_value = Some(sign(&message, keypair).to_multibase());

    let proof_value = serde_json::to_value(&proof).expect("serialize proof");
    let mut secured = document.clone();
    let obj = secured.as_object_mut().expect("document must be an object");
    let proofs = match obj.remove("proof") {
        None | Some(Value::Null) => proof_value,
        Some(Value::Array(mut existing)) => {
            existing.push(proof_value);
            Value::Array(existing)
        }
        Some(existing) => Value::Array(vec![existing, proof_value]),
    };
    obj.insert("proof".into(), proofs);
    secured
}
