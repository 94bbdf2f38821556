//! Integration test: single-credential verification across crates.
//!
//! Credentials are signed with real Ed25519 keys, resolved through
//! `did:key` and `did:web`, and checked end to end by the verifier.

use credverify_core::report::{
    EXPIRATION_STEP_ID, REGISTERED_ISSUER_STEP_ID, VALID_SIGNATURE_STEP_ID,
};
use credverify_core::{ErrorName, VerificationResponse};
use credverify_integration_tests::{v1_credential, v2_credential, Harness, Signer};
use serde_json::{json, Value};

const ID: &str = "urn:uuid:5c4b0c58-4a1a-4f0b-8d1f-5b8b0f3e2d77";

fn error_name(response: &VerificationResponse) -> Option<ErrorName> {
    response.errors().first().map(|e| e.name)
}

fn step_ids(response: &VerificationResponse) -> Vec<&str> {
    response.log().iter().map(|s| s.id.as_str()).collect()
}

// =========================================================================
// Preconditions
// =========================================================================

#[tokio::test]
async fn test_missing_context_is_invalid_jsonld() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut vc = signer.sign(&v2_credential(&signer.did, ID));
    vc.as_object_mut().unwrap().remove("@context");

    let response = h.verifier.verify_credential(vc, &[]).await;
    assert_eq!(error_name(&response), Some(ErrorName::InvalidJsonld));
    assert!(response.log().is_empty());
}

#[tokio::test]
async fn test_foreign_context_is_no_vc_context() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["@context"] = json!(["https://schema.org/"]);

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert_eq!(error_name(&response), Some(ErrorName::NoVcContext));
}

#[tokio::test]
async fn test_non_uri_id_is_invalid_credential_id() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let doc = v2_credential(&signer.did, "0923lksjf");

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert_eq!(error_name(&response), Some(ErrorName::InvalidCredentialId));
}

#[tokio::test]
async fn test_unsigned_credential_is_no_proof() {
    let h = Harness::new();
    let response = h
        .verifier
        .verify_credential(v1_credential("did:example:issuer", ID), &[])
        .await;
    assert_eq!(error_name(&response), Some(ErrorName::NoProof));
    assert_eq!(h.fetcher.total_requests(), 0);
}

// =========================================================================
// Signatures
// =========================================================================

#[tokio::test]
async fn test_tampered_credentials_are_invalid_signature() {
    let h = Harness::new();
    let signer = Signer::did_key();

    for doc in [v1_credential(&signer.did, ID), v2_credential(&signer.did, ID)] {
        let mut vc = signer.sign(&doc);
        vc["credentialSubject"]["degree"]["name"] = json!("Doctor of Philosophy");

        let response = h.verifier.verify_credential(vc.clone(), &[]).await;
        assert_eq!(error_name(&response), Some(ErrorName::InvalidSignature));
        // The credential is echoed back unchanged.
        assert_eq!(response.credential(), &vc);
    }
}

#[tokio::test]
async fn test_signature_by_another_key_is_invalid() {
    let h = Harness::new();
    let issuer = Signer::did_key();
    let impostor = Signer::did_key();
    // Claims the issuer, signed by someone else.
    let vc = impostor.sign(&v2_credential(&issuer.did, ID));

    let response = h.verifier.verify_credential(vc, &[]).await;
    assert_eq!(error_name(&response), Some(ErrorName::InvalidSignature));
}

#[tokio::test]
async fn test_did_web_issuer_resolves() {
    let h = Harness::new();
    let signer = Signer::did_web("issuer.example.edu");
    signer.publish(&h.fetcher);

    let response = h
        .verifier
        .verify_credential(signer.sign(&v1_credential(&signer.did, ID)), &[])
        .await;
    assert!(!response.is_fatal(), "{:?}", response.errors());
    assert_eq!(
        response.step(VALID_SIGNATURE_STEP_ID).and_then(|s| s.valid),
        Some(true)
    );
}

#[tokio::test]
async fn test_unreachable_did_web_is_did_web_unresolved() {
    let h = Harness::new();
    let signer = Signer::did_web("gone.example.edu");

    let response = h
        .verifier
        .verify_credential(signer.sign(&v2_credential(&signer.did, ID)), &[])
        .await;
    assert_eq!(error_name(&response), Some(ErrorName::DidWebUnresolved));
    assert!(response.errors()[0]
        .message
        .contains("https://gone.example.edu/.well-known/did.json"));
}

#[tokio::test]
async fn test_unknown_proof_suite_is_fatal() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut vc = signer.sign(&v2_credential(&signer.did, ID));
    vc["proof"]["type"] = json!("Ed25519Signature2020");
    vc["proof"].as_object_mut().unwrap().remove("cryptosuite");

    let response = h.verifier.verify_credential(vc, &[]).await;
    assert_eq!(error_name(&response), Some(ErrorName::InvalidSignature));
}

#[tokio::test]
async fn test_missing_subject_is_unknown_error() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc.as_object_mut().unwrap().remove("credentialSubject");

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert_eq!(error_name(&response), Some(ErrorName::UnknownError));
}

// =========================================================================
// Validity period and registries
// =========================================================================

#[tokio::test]
async fn test_expired_credentials_are_not_fatal() {
    let h = Harness::new();
    let signer = Signer::did_key();

    let mut v1 = v1_credential(&signer.did, ID);
    v1["expirationDate"] = json!("2020-01-01T00:00:00Z");
    let mut v2 = v2_credential(&signer.did, ID);
    v2["validUntil"] = json!("2020-01-01T00:00:00Z");

    for doc in [v1, v2] {
        let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
        assert!(!response.is_fatal());
        let expiration = response.step(EXPIRATION_STEP_ID).unwrap();
        assert_eq!(expiration.valid, Some(false));
        assert_eq!(
            response.step(VALID_SIGNATURE_STEP_ID).and_then(|s| s.valid),
            Some(true)
        );
    }
}

#[tokio::test]
async fn test_clean_credential_has_all_steps_valid() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let registry = h.registry("Main", "https://registry.example.org/main.json", &[&signer.did]);

    let response = h
        .verifier
        .verify_credential(signer.sign(&v1_credential(&signer.did, ID)), &[registry])
        .await;
    assert!(response.errors().is_empty());
    assert!(response.all_steps_valid());
}

#[tokio::test]
async fn test_v2_issuer_in_one_of_two_registries() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let registries = vec![
        h.registry("First", "https://first.example.org/registry.json", &["did:web:other.example"]),
        h.registry("Second", "https://second.example.org/registry.json", &[&signer.did]),
    ];

    let response = h
        .verifier
        .verify_credential(signer.sign(&v2_credential(&signer.did, ID)), &registries)
        .await;

    assert_eq!(
        step_ids(&response),
        vec![VALID_SIGNATURE_STEP_ID, EXPIRATION_STEP_ID, REGISTERED_ISSUER_STEP_ID]
    );
    assert!(response.all_steps_valid());
    let registered = response.step(REGISTERED_ISSUER_STEP_ID).unwrap();
    let matches = registered.matching_issuers.as_ref().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].registry.name, "Second");
    assert_eq!(registered.unchecked_registries.as_ref().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_unreachable_registry_is_reported_unchecked() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let registries = vec![
        h.registry("Up", "https://up.example.org/registry.json", &[&signer.did]),
        credverify_core::RegistryConfig::legacy("Down", "https://down.example.org/registry.json"),
    ];

    let response = h
        .verifier
        .verify_credential(signer.sign(&v2_credential(&signer.did, ID)), &registries)
        .await;
    let registered = response.step(REGISTERED_ISSUER_STEP_ID).unwrap();
    assert_eq!(registered.valid, Some(true));
    let unchecked = registered.unchecked_registries.as_ref().unwrap();
    assert_eq!(unchecked.len(), 1);
    assert_eq!(unchecked[0].name, "Down");
    assert_eq!(unchecked[0].url, "https://down.example.org/registry.json");
}

#[tokio::test]
async fn test_registry_lookup_is_deterministic() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let registries = vec![
        h.registry("A", "https://a.example.org/registry.json", &[&signer.did]),
        h.registry("B", "https://b.example.org/registry.json", &[&signer.did]),
    ];
    let vc = signer.sign(&v2_credential(&signer.did, ID));

    let first = h.verifier.verify_credential(vc.clone(), &registries).await;
    let second = h.verifier.verify_credential(vc, &registries).await;
    assert_eq!(first, second);

    let names: Vec<_> = first
        .step(REGISTERED_ISSUER_STEP_ID)
        .and_then(|s| s.matching_issuers.as_ref())
        .unwrap()
        .iter()
        .map(|m| m.registry.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(h.fetcher.request_count("https://a.example.org/registry.json"), 1);
}

// =========================================================================
// Report shape
// =========================================================================

#[tokio::test]
async fn test_report_serialization() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let response = h
        .verifier
        .verify_credential(signer.sign(&v2_credential(&signer.did, ID)), &[])
        .await;

    let json: Value = serde_json::to_value(&response).unwrap();
    assert!(json.get("errors").is_none());
    assert_eq!(json["log"][0], json!({"id": "valid_signature", "valid": true}));
    assert_eq!(json["log"][2]["id"], "registered_issuer");
    assert_eq!(json["log"][2]["matchingIssuers"], json!([]));
    assert_eq!(json["additionalInformation"][0]["id"], "schema_check");
    assert_eq!(json["additionalInformation"][0]["results"], "NO_SCHEMA");

    let fatal = h
        .verifier
        .verify_credential(v2_credential(&signer.did, ID), &[])
        .await;
    let json: Value = serde_json::to_value(&fatal).unwrap();
    assert_eq!(json["errors"][0]["name"], "no_proof");
    assert!(json.get("log").is_none());
}
