use async_trait::async_trait;
use credverify_core::{Credential, StepError};

/// Result of a revocation/suspension status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The status list was read; `valid` is false when the credential's
    /// bit is set.
    Checked { valid: bool },
    /// The status could not be determined.
    Unavailable(StepError),
}

/// Status hook the proof engine calls after a successful signature check.
#[async_trait]
pub trait StatusCheck: Send + Sync {
    async fn check(&self, credential: &Credential) -> StatusOutcome;
}
