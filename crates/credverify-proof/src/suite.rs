use async_trait::async_trait;
use credverify_core::Proof;
use credverify_identity::DidResolver;
use serde_json::Value;

use crate::error::ProofError;

/// A proof type a verifier accepts.
#[async_trait]
pub trait ProofSuite: Send + Sync {
    /// Value of the proof's `type` member, e.g. `DataIntegrityProof`.
    fn proof_type(&self) -> &str;

    /// Value of the proof's `cryptosuite` member, when the suite names one.
    fn cryptosuite(&self) -> Option<&str>;

    /// Whether this suite is responsible for `proof`.
    fn matches(&self, proof: &Proof) -> bool {
        if proof.proof_type != self.proof_type() {
            return false;
        }
        match self.cryptosuite() {
            Some(suite) => proof.cryptosuite.as_deref() == Some(suite),
            None => true,
        }
    }

    /// Verify one proof over `document`. `document` is the secured
    /// document as received, proofs included.
    async fn verify_proof(
        &self,
        document: &Value,
        proof: &Proof,
        resolver: &dyn DidResolver,
    ) -> Result<(), ProofError>;
}
