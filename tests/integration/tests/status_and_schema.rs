//! Integration test: revocation status and schema conformance.

use credverify_core::report::{
    EXPIRATION_STEP_ID, REGISTERED_ISSUER_STEP_ID, REVOCATION_STATUS_STEP_ID,
    VALID_SIGNATURE_STEP_ID,
};
use credverify_core::{
    SchemaProvenance, SchemaResults, SchemaSentinel, StepErrorName, VC_V2_CONTEXT,
};
use credverify_integration_tests::{
    bitstring_status, bitstring_with, status_list_credential, v2_credential, Harness, Signer,
};
use serde_json::json;

const ID: &str = "https://university.example/credentials/3732";
const LIST_URL: &str = "https://university.example/status/1";

// =========================================================================
// Bitstring status lists
// =========================================================================

#[tokio::test]
async fn test_unrevoked_credential() {
    let h = Harness::new();
    h.fetcher.insert_json(
        LIST_URL,
        &status_list_credential(LIST_URL, "revocation", &bitstring_with(&[7])),
    );
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialStatus"] = bitstring_status(LIST_URL, 94567);

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    let status = response.step(REVOCATION_STATUS_STEP_ID).unwrap();
    assert_eq!(status.valid, Some(true));
}

#[tokio::test]
async fn test_revoked_credential() {
    let h = Harness::new();
    h.fetcher.insert_json(
        LIST_URL,
        &status_list_credential(LIST_URL, "revocation", &bitstring_with(&[94567])),
    );
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialStatus"] = bitstring_status(LIST_URL, 94567);

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert!(!response.is_fatal());
    assert_eq!(
        response.step(REVOCATION_STATUS_STEP_ID).and_then(|s| s.valid),
        Some(false)
    );
    assert!(!response.all_steps_valid());
}

#[tokio::test]
async fn test_missing_status_list_is_not_fatal() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let registry = h.registry("Main", "https://registry.example.org/r.json", &[&signer.did]);
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialStatus"] = bitstring_status(LIST_URL, 3);

    let response = h
        .verifier
        .verify_credential(signer.sign(&doc), &[registry])
        .await;
    assert!(!response.is_fatal());

    let ids: Vec<_> = response.log().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            VALID_SIGNATURE_STEP_ID,
            EXPIRATION_STEP_ID,
            REVOCATION_STATUS_STEP_ID,
            REGISTERED_ISSUER_STEP_ID
        ]
    );
    let status = response.step(REVOCATION_STATUS_STEP_ID).unwrap();
    let error = status.error.as_ref().unwrap();
    assert_eq!(error.name, StepErrorName::StatusListNotFound);
    assert!(error.message.contains(LIST_URL));
    assert_eq!(status.valid, None);

    // The other steps are unaffected.
    assert_eq!(
        response.step(VALID_SIGNATURE_STEP_ID).and_then(|s| s.valid),
        Some(true)
    );
    assert_eq!(
        response.step(EXPIRATION_STEP_ID).and_then(|s| s.valid),
        Some(true)
    );
    let registered = response.step(REGISTERED_ISSUER_STEP_ID).unwrap();
    assert_eq!(registered.valid, Some(true));
    assert_eq!(registered.matching_issuers.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_status_list_for_other_purpose_is_invalid() {
    let h = Harness::new();
    h.fetcher.insert_json(
        LIST_URL,
        &status_list_credential(LIST_URL, "suspension", &bitstring_with(&[])),
    );
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialStatus"] = bitstring_status(LIST_URL, 3);

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    let status = response.step(REVOCATION_STATUS_STEP_ID).unwrap();
    assert_eq!(
        status.error.as_ref().map(|e| e.name),
        Some(StepErrorName::StatusListInvalid)
    );
}

#[tokio::test]
async fn test_legacy_status_types_are_valid_without_fetch() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialStatus"] = json!({
        "id": "https://example.com/status/2021#5",
        "type": "StatusList2021Entry",
        "statusPurpose": "revocation",
        "statusListIndex": "5",
        "statusListCredential": "https://example.com/status/2021"
    });

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert_eq!(
        response.step(REVOCATION_STATUS_STEP_ID).and_then(|s| s.valid),
        Some(true)
    );
    assert_eq!(h.fetcher.request_count("https://example.com/status/2021"), 0);
}

#[tokio::test]
async fn test_unrecognized_status_type_is_skipped() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialStatus"] = json!({"id": "https://example.com/crl#1", "type": "CRLEntry"});

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert!(response.step(REVOCATION_STATUS_STEP_ID).is_none());
    assert!(!response.is_fatal());
}

// =========================================================================
// Schemas
// =========================================================================

#[tokio::test]
async fn test_explicit_schema_is_reported() {
    let h = Harness::new();
    let schema_url = "https://university.example/schemas/degree.json";
    h.fetcher.insert_json(
        schema_url,
        &json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["credentialSubject"],
            "properties": {"credentialSubject": {"required": ["degree"]}}
        }),
    );
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialSchema"] = json!({"id": schema_url, "type": "JsonSchema"});

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    match response.schema_results() {
        Some(SchemaResults::Checked(results)) => {
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].schema, schema_url);
            assert_eq!(results[0].provenance, SchemaProvenance::Explicit);
            assert!(results[0].result.valid);
        }
        other => panic!("unexpected schema results: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_schema_never_escalates() {
    let h = Harness::new();
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["credentialSchema"] = json!([
        {"id": "https://nowhere.example/schema.json", "type": "JsonSchema"}
    ]);

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    assert!(!response.is_fatal());
    assert_eq!(
        response.schema_results(),
        Some(&SchemaResults::Sentinel(SchemaSentinel::InvalidSchema))
    );
}

#[tokio::test]
async fn test_open_badge_schema_is_inferred() {
    let h = Harness::new();
    let schema_url =
        "https://purl.imsglobal.org/spec/ob/v3p0/schema/json/ob_v3p0_achievementcredential_schema.json";
    h.fetcher.insert_json(
        schema_url,
        &json!({"type": "object", "required": ["credentialSubject"]}),
    );
    let signer = Signer::did_key();
    let mut doc = v2_credential(&signer.did, ID);
    doc["@context"] = json!([
        VC_V2_CONTEXT,
        "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.3.json"
    ]);
    doc["type"] = json!(["VerifiableCredential", "OpenBadgeCredential"]);

    let response = h.verifier.verify_credential(signer.sign(&doc), &[]).await;
    match response.schema_results() {
        Some(SchemaResults::Checked(results)) => {
            assert_eq!(results[0].provenance, SchemaProvenance::Inferred);
            assert_eq!(
                results[0].source,
                "Assumed based on vc.type: 'OpenBadgeCredential' and vc version: 'version 2'"
            );
            assert!(results[0].result.valid);
        }
        other => panic!("unexpected schema results: {:?}", other),
    }
}
