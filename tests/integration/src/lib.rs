//! Shared fixtures for the integration tests: signing issuers, credential
//! templates, status lists and registry manifests served from a
//! [`StaticFetcher`].

use std::io::Write;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credverify_core::{RegistryConfig, VC_V1_CONTEXT, VC_V2_CONTEXT};
use credverify_credentials::{CredentialVerifier, PresentationVerifier};
use credverify_crypto::KeyPair;
use credverify_identity::{did_web_url, DidDocument};
use credverify_network::StaticFetcher;
use credverify_proof::engine::{ASSERTION_METHOD, AUTHENTICATION};
use credverify_proof::testing::{sign_document_with, ProofOptions};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

/// A signer identified by a DID.
pub struct Signer {
    pub keypair: KeyPair,
    pub did: String,
    pub verification_method: String,
}

impl Signer {
    pub fn did_key() -> Self {
        let keypair = KeyPair::generate();
        let did = keypair.public_key().did_key();
        let verification_method = keypair.public_key().did_key_vm();
        Self {
            keypair,
            did,
            verification_method,
        }
    }

    /// A `did:web` signer. Its DID document is only reachable once
    /// [`Signer::publish`] has been called.
    pub fn did_web(domain: &str) -> Self {
        let keypair = KeyPair::generate();
        let did = format!("did:web:{}", domain);
        let verification_method = format!("{}#key-1", did);
        Self {
            keypair,
            did,
            verification_method,
        }
    }

    /// Serve this signer's DID document. A no-op for `did:key`.
    pub fn publish(&self, fetcher: &StaticFetcher) {
        if let Ok(url) = did_web_url(&self.did) {
            let doc = DidDocument::with_ed25519(
                self.did.clone(),
                self.verification_method.clone(),
                &self.keypair.public_key(),
            );
            fetcher.insert_json(url, &serde_json::to_value(doc).unwrap());
        }
    }

    pub fn sign(&self, document: &Value) -> Value {
        self.sign_for(document, ASSERTION_METHOD, None)
    }

    /// Sign a presentation with an `authentication` proof.
    pub fn sign_presentation(&self, presentation: &Value, challenge: Option<&str>) -> Value {
        self.sign_for(presentation, AUTHENTICATION, challenge)
    }

    fn sign_for(&self, document: &Value, purpose: &str, challenge: Option<&str>) -> Value {
        let mut options = ProofOptions::did_key(&self.keypair, purpose);
        options.verification_method = self.verification_method.clone();
        options.challenge = challenge.map(str::to_string);
        sign_document_with(document, &self.keypair, &options)
    }
}

/// Unsigned VC Data Model 1.1 credential.
pub fn v1_credential(issuer: &str, id: &str) -> Value {
    json!({
        "@context": [VC_V1_CONTEXT],
        "id": id,
        "type": ["VerifiableCredential"],
        "issuer": {"id": issuer, "name": "Example University"},
        "issuanceDate": "2024-01-01T00:00:00Z",
        "credentialSubject": {
            "id": "did:example:alice",
            "degree": {"type": "BachelorDegree", "name": "Bachelor of Science"}
        }
    })
}

/// Unsigned VC Data Model 2.0 credential.
pub fn v2_credential(issuer: &str, id: &str) -> Value {
    json!({
        "@context": [VC_V2_CONTEXT],
        "id": id,
        "type": ["VerifiableCredential"],
        "issuer": issuer,
        "validFrom": "2024-01-01T00:00:00Z",
        "credentialSubject": {
            "id": "did:example:alice",
            "degree": {"type": "BachelorDegree", "name": "Bachelor of Science"}
        }
    })
}

/// Multibase base64url GZIP encoding of a raw bitstring.
pub fn encode_bitstring(bits: &[u8]) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bits).unwrap();
    format!("u{}", URL_SAFE_NO_PAD.encode(encoder.finish().unwrap()))
}

/// A 16 KiB bitstring with the given entries set.
pub fn bitstring_with(set: &[usize]) -> Vec<u8> {
    let mut bits = vec![0u8; 16 * 1024];
    for &index in set {
        bits[index / 8] |= 0x80 >> (index % 8);
    }
    bits
}

pub fn status_list_credential(url: &str, purpose: &str, bits: &[u8]) -> Value {
    json!({
        "@context": [VC_V2_CONTEXT],
        "id": url,
        "type": ["VerifiableCredential", "BitstringStatusListCredential"],
        "issuer": "did:example:status-issuer",
        "credentialSubject": {
            "id": format!("{}#list", url),
            "type": "BitstringStatusList",
            "statusPurpose": purpose,
            "encodedList": encode_bitstring(bits)
        }
    })
}

/// A `credentialStatus` entry pointing at `index` of the list at `url`.
pub fn bitstring_status(url: &str, index: usize) -> Value {
    json!({
        "id": format!("{}#{}", url, index),
        "type": "BitstringStatusListEntry",
        "statusPurpose": "revocation",
        "statusListIndex": index.to_string(),
        "statusListCredential": url
    })
}

/// A legacy registry manifest listing `dids`.
pub fn legacy_registry(dids: &[&str]) -> Value {
    let entries: serde_json::Map<String, Value> = dids
        .iter()
        .map(|did| {
            (
                did.to_string(),
                json!({"name": format!("Issuer {}", did), "location": "Example City"}),
            )
        })
        .collect();
    json!({"meta": {"created": "2024-01-01"}, "registry": entries})
}

/// A fetcher plus verifiers wired to it.
pub struct Harness {
    pub fetcher: Arc<StaticFetcher>,
    pub verifier: Arc<CredentialVerifier>,
}

impl Harness {
    pub fn new() -> Self {
        let fetcher = Arc::new(StaticFetcher::new());
        let verifier = Arc::new(CredentialVerifier::new(fetcher.clone()));
        Self { fetcher, verifier }
    }

    pub fn presentations(&self) -> PresentationVerifier {
        PresentationVerifier::new(self.verifier.clone())
    }

    /// Serve a legacy registry and return its configuration entry.
    pub fn registry(&self, name: &str, url: &str, dids: &[&str]) -> RegistryConfig {
        self.fetcher.insert_json(url, &legacy_registry(dids));
        RegistryConfig::legacy(name, url)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
