//! Revocation and suspension status resolution.
//!
//! The first `credentialStatus` entry's type picks the mechanism. Bitstring
//! status lists are fetched and read; the older `StatusList2021Entry` and
//! `1EdTechRevocationList` types are accepted without a check.

use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credverify_core::{Credential, CredentialStatusEntry, StepError, StepErrorName};
use credverify_network::{FetchError, HttpFetcher};
use credverify_proof::{StatusCheck, StatusOutcome};
use flate2::bufread::GzDecoder;
use serde_json::Value;

use crate::error::CredentialError;

pub const BITSTRING_STATUS_LIST_ENTRY: &str = "BitstringStatusListEntry";
pub const STATUS_LIST_2021_ENTRY: &str = "StatusList2021Entry";
pub const ONE_EDTECH_REVOCATION_LIST: &str = "1EdTechRevocationList";

/// Upper bound on a decompressed status list.
pub const MAX_STATUS_LIST_BYTES: u64 = 16 * 1024 * 1024;

/// Status mechanisms, keyed on `credentialStatus.type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMechanism {
    BitstringStatusList,
    StatusList2021,
    OneEdTechRevocationList,
    Unrecognized(String),
}

impl StatusMechanism {
    pub fn from_type(status_type: &str) -> Self {
        match status_type {
            BITSTRING_STATUS_LIST_ENTRY => Self::BitstringStatusList,
            STATUS_LIST_2021_ENTRY => Self::StatusList2021,
            ONE_EDTECH_REVOCATION_LIST => Self::OneEdTechRevocationList,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// A status checker selected for a credential.
#[derive(Clone)]
pub enum StatusChecker {
    /// Reads the credential's bit from a Bitstring Status List.
    Bitstring(BitstringStatusCheck),
    /// Superseded mechanisms; always reported valid.
    LegacyIgnored,
}

impl StatusChecker {
    /// Type name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bitstring(_) => BITSTRING_STATUS_LIST_ENTRY,
            Self::LegacyIgnored => "legacy",
        }
    }
}

#[async_trait]
impl StatusCheck for StatusChecker {
    async fn check(&self, credential: &Credential) -> StatusOutcome {
        match self {
            Self::Bitstring(check) => check.check(credential).await,
            Self::LegacyIgnored => StatusOutcome::Checked { valid: true },
        }
    }
}

/// Picks the status checker for a credential.
#[derive(Clone)]
pub struct StatusResolver {
    fetcher: Arc<dyn HttpFetcher>,
}

impl StatusResolver {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// The checker for the credential's first status entry, or `None` when
    /// it declares no status or a type this verifier does not know.
    pub fn select_checker(&self, credential: &Credential) -> Option<StatusChecker> {
        let entry = match credential.primary_status() {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "unreadable credentialStatus, skipping status check");
                return None;
            }
        };
        match StatusMechanism::from_type(entry.primary_type().unwrap_or_default()) {
            StatusMechanism::BitstringStatusList => Some(StatusChecker::Bitstring(
                BitstringStatusCheck::new(self.fetcher.clone()),
            )),
            StatusMechanism::StatusList2021 | StatusMechanism::OneEdTechRevocationList => {
                Some(StatusChecker::LegacyIgnored)
            }
            StatusMechanism::Unrecognized(other) => {
                tracing::debug!(status_type = %other, "unrecognized status type, no status check");
                None
            }
        }
    }
}

/// Bitstring Status List check.
#[derive(Clone)]
pub struct BitstringStatusCheck {
    fetcher: Arc<dyn HttpFetcher>,
}

impl BitstringStatusCheck {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// Whether the entry's status bits are all clear.
    pub async fn check_entry(&self, entry: &CredentialStatusEntry) -> Result<bool, CredentialError> {
        let list_url = entry
            .status_list_credential
            .as_deref()
            .ok_or_else(|| CredentialError::StatusList("missing statusListCredential".into()))?;
        let index = entry
            .status_list_index
            .as_ref()
            .ok_or_else(|| CredentialError::StatusList("missing statusListIndex".into()))?
            .value()?;
        let purpose = entry
            .status_purpose
            .as_deref()
            .ok_or_else(|| CredentialError::StatusList("missing statusPurpose".into()))?;
        let size = entry.status_size.unwrap_or(1) as usize;
        if !(1..=32).contains(&size) {
            return Err(CredentialError::StatusList(format!(
                "unsupported statusSize {}",
                size
            )));
        }

        let list = self.fetcher.fetch_json(list_url).await?;
        let subject = list_subject(&list)?;
        if !purpose_matches(subject.get("statusPurpose"), purpose) {
            return Err(CredentialError::StatusList(format!(
                "status list {} does not serve purpose {}",
                list_url, purpose
            )));
        }
        let encoded = subject
            .get("encodedList")
            .and_then(Value::as_str)
            .ok_or_else(|| CredentialError::StatusList("status list has no encodedList".into()))?;
        let bits = decode_list(encoded)?;
        let status = read_status(&bits, index, size)?;

        tracing::debug!(url = %list_url, index, purpose, status, "status list read");
        Ok(status == 0)
    }

    async fn check(&self, credential: &Credential) -> StatusOutcome {
        let entries = match credential.status_entries() {
            Ok(entries) => entries,
            Err(e) => return invalid(e.to_string()),
        };
        let bitstring: Vec<_> = entries
            .into_iter()
            .filter(|e| e.primary_type() == Some(BITSTRING_STATUS_LIST_ENTRY))
            .collect();
        if bitstring.is_empty() {
            return invalid(format!(
                "credential declares no {} status",
                BITSTRING_STATUS_LIST_ENTRY
            ));
        }

        let mut valid = true;
        for entry in &bitstring {
            match self.check_entry(entry).await {
                Ok(clear) => valid &= clear,
                Err(CredentialError::Fetch(e)) if e.is_transport() => return not_found(&e),
                Err(e) => return invalid(e.to_string()),
            }
        }
        StatusOutcome::Checked { valid }
    }
}

fn not_found(e: &FetchError) -> StatusOutcome {
    StatusOutcome::Unavailable(StepError::new(
        StepErrorName::StatusListNotFound,
        format!("Could not retrieve the status list from {}: {}", e.url(), e),
    ))
}

fn invalid(message: String) -> StatusOutcome {
    StatusOutcome::Unavailable(StepError::new(StepErrorName::StatusListInvalid, message))
}

fn list_subject(list: &Value) -> Result<&Value, CredentialError> {
    match list.get("credentialSubject") {
        Some(subject @ Value::Object(_)) => Ok(subject),
        Some(Value::Array(subjects)) => subjects
            .first()
            .ok_or_else(|| CredentialError::StatusList("status list has no subject".into())),
        _ => Err(CredentialError::StatusList(
            "status list has no credentialSubject".into(),
        )),
    }
}

fn purpose_matches(declared: Option<&Value>, wanted: &str) -> bool {
    match declared {
        Some(Value::String(p)) => p == wanted,
        Some(Value::Array(ps)) => ps.iter().any(|p| p.as_str() == Some(wanted)),
        _ => false,
    }
}

/// Decode a multibase base64url (`u`) GZIP-compressed bitstring.
pub fn decode_list(encoded: &str) -> Result<Vec<u8>, CredentialError> {
    let body = encoded.strip_prefix('u').unwrap_or(encoded);
    let compressed = URL_SAFE_NO_PAD
        .decode(body.trim_end_matches('='))
        .map_err(|e| CredentialError::StatusList(format!("encodedList is not base64url: {}", e)))?;
    let mut bits = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .take(MAX_STATUS_LIST_BYTES + 1)
        .read_to_end(&mut bits)
        .map_err(|e| CredentialError::StatusList(format!("encodedList is not gzip: {}", e)))?;
    if bits.len() as u64 > MAX_STATUS_LIST_BYTES {
        return Err(CredentialError::StatusList(format!(
            "encodedList expands beyond {} bytes",
            MAX_STATUS_LIST_BYTES
        )));
    }
    Ok(bits)
}

/// Read `size` bits starting at entry `index`. Bit 0 is the most
/// significant bit of byte 0.
pub fn read_status(bits: &[u8], index: usize, size: usize) -> Result<u32, CredentialError> {
    let out_of_range = || CredentialError::StatusList(format!("index {} out of range", index));
    let start = index.checked_mul(size).ok_or_else(out_of_range)?;
    let end = start.checked_add(size).ok_or_else(out_of_range)?;
    if end > bits.len() * 8 {
        return Err(CredentialError::StatusList(format!(
            "index {} out of range for a list of {} entries",
            index,
            bits.len() * 8 / size
        )));
    }
    let mut value = 0u32;
    for position in start..end {
        let bit = (bits[position / 8] >> (7 - position % 8)) & 1;
        value = (value << 1) | u32::from(bit);
    }
    Ok(value)
}
