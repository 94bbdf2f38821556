//! `DataIntegrityProof` with the `eddsa-jcs-2022` cryptosuite.
//!
//! The signed message is `SHA-256(JCS(proofConfig)) || SHA-256(JCS(document))`
//! where `document` is the secured document without its `proof` member and
//! `proofConfig` is the proof without `proofValue`, carrying the document's
//! `@context`. The signature is a base58btc multibase Ed25519 signature.

use async_trait::async_trait;
use credverify_core::Proof;
use credverify_crypto::{canonical_digest, verify, CryptoError, Signature};
use credverify_identity::DidResolver;
use serde_json::Value;

use crate::error::ProofError;
use crate::suite::ProofSuite;

pub const DATA_INTEGRITY_PROOF: &str = "DataIntegrityProof";
pub const EDDSA_JCS_2022: &str = "eddsa-jcs-2022";

#[derive(Debug, Default, Clone, Copy)]
pub struct EddsaJcs2022;

impl EddsaJcs2022 {
    /// The bytes an issuer signs for `proof` over `document`.
    pub fn signing_input(document: &Value, proof: &Proof) -> Result<Vec<u8>, ProofError> {
        let mut unsecured = document.clone();
        let context = match unsecured.as_object_mut() {
            Some(obj) => {
                obj.remove("proof");
                obj.get("@context").cloned()
            }
            None => {
                return Err(ProofError::MalformedProof(
                    "secured document is not a JSON object".into(),
                ))
            }
        };

        let mut config = serde_json::to_value(proof)
            .map_err(|e| ProofError::MalformedProof(e.to_string()))?;
        if let Some(obj) = config.as_object_mut() {
            obj.remove("proofValue");
            if let Some(context) = context {
                obj.insert("@context".into(), context);
            }
        }

        let mut message = Vec::with_capacity(64);
        message.extend_from_slice(&canonical_digest(&config)?);
        message.extend_from_slice(&canonical_digest(&unsecured)?);
        Ok(message)
    }
}

#[async_trait]
impl ProofSuite for EddsaJcs2022 {
    fn proof_type(&self) -> &str {
        DATA_INTEGRITY_PROOF
    }

    fn cryptosuite(&self) -> Option<&str> {
        Some(EDDSA_JCS_2022)
    }

    async fn verify_proof(
        &self,
        document: &Value,
        proof: &Proof,
        resolver: &dyn DidResolver,
    ) -> Result<(), ProofError> {
        let method = proof
            .verification_method
            .as_deref()
            .ok_or_else(|| ProofError::MalformedProof("missing verificationMethod".into()))?;
        let proof_value = proof
            .proof_value
            .as_deref()
            .ok_or_else(|| ProofError::MalformedProof("missing proofValue".into()))?;
        let signature = Signature::from_multibase(proof_value)?;

        let public_key = resolver.resolve_verification_method(method).await?;
        let message = Self::signing_input(document, proof)?;

        verify(&message, &signature, &public_key).map_err(|e| match e {
            CryptoError::SignatureVerificationFailed => ProofError::InvalidSignature(method.to_string()),
            other => ProofError::Crypto(other),
        })?;
        tracing::debug!(verification_method = %method, "eddsa-jcs-2022 proof verified");
        Ok(())
    }
}
