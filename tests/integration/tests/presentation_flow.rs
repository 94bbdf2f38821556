//! Integration test: presentations carrying several credentials.

use credverify_core::report::{REGISTERED_ISSUER_STEP_ID, REVOCATION_STATUS_STEP_ID};
use credverify_core::{ErrorName, PresentationSignature, PresentationVerificationResponse};
use credverify_credentials::PresentationOptions;
use credverify_integration_tests::{
    bitstring_status, bitstring_with, status_list_credential, v1_credential, v2_credential,
    Harness, Signer,
};
use serde_json::{json, Value};

const LIST_URL: &str = "https://university.example/status/7";

fn envelope(holder: &Signer, credentials: Vec<Value>) -> Value {
    json!({
        "@context": ["https://www.w3.org/ns/credentials/v2"],
        "type": ["VerifiablePresentation"],
        "holder": holder.did,
        "verifiableCredential": credentials
    })
}

fn credential_ids(response: &PresentationVerificationResponse) -> Vec<String> {
    response
        .credential_results()
        .iter()
        .map(|r| r.credential()["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_results_keep_input_order() {
    let h = Harness::new();
    let issuer = Signer::did_key();
    let holder = Signer::did_key();
    let ids: Vec<String> = (0..6).map(|n| format!("urn:example:vc:{}", n)).collect();
    let credentials = ids
        .iter()
        .enumerate()
        .map(|(n, id)| {
            if n % 2 == 0 {
                issuer.sign(&v1_credential(&issuer.did, id))
            } else {
                issuer.sign(&v2_credential(&issuer.did, id))
            }
        })
        .collect();
    let vp = holder.sign_presentation(&envelope(&holder, credentials), Some("nonce-1"));

    let options = PresentationOptions {
        challenge: Some("nonce-1".into()),
        ..PresentationOptions::default()
    };
    let response = h.presentations().verify_presentation(vp, &[], &options).await;

    assert_eq!(response.signature(), Some(PresentationSignature::Valid));
    assert_eq!(credential_ids(&response), ids);
    assert!(response.credential_results().iter().all(|r| !r.is_fatal()));
}

#[tokio::test]
async fn test_did_web_holder() {
    let h = Harness::new();
    let issuer = Signer::did_key();
    let holder = Signer::did_web("wallet.example.com");
    holder.publish(&h.fetcher);

    let vc = issuer.sign(&v2_credential(&issuer.did, "urn:example:vc:web"));
    let vp = holder.sign_presentation(&envelope(&holder, vec![vc]), None);

    let response = h
        .presentations()
        .verify_presentation(vp, &[], &PresentationOptions::default())
        .await;
    assert_eq!(response.signature(), Some(PresentationSignature::Valid));
}

#[tokio::test]
async fn test_tampered_presentation_is_invalid_but_credentials_are_checked() {
    let h = Harness::new();
    let issuer = Signer::did_key();
    let holder = Signer::did_key();
    let registry = h.registry("Main", "https://registry.example.org/r.json", &[&issuer.did]);

    let vc = issuer.sign(&v2_credential(&issuer.did, "urn:example:vc:1"));
    let mut vp = holder.sign_presentation(&envelope(&holder, vec![vc]), None);
    vp["holder"] = json!("did:example:mallory");

    let response = h
        .presentations()
        .verify_presentation(vp, &[registry], &PresentationOptions::default())
        .await;
    assert_eq!(response.signature(), Some(PresentationSignature::Invalid));
    let result = &response.credential_results()[0];
    assert!(result.all_steps_valid());
    assert_eq!(
        result.step(REGISTERED_ISSUER_STEP_ID).and_then(|s| s.valid),
        Some(true)
    );
}

#[tokio::test]
async fn test_mixed_credentials() {
    let h = Harness::new();
    let issuer = Signer::did_key();
    let holder = Signer::did_key();

    let good = issuer.sign(&v2_credential(&issuer.did, "urn:example:vc:good"));
    let mut tampered = issuer.sign(&v2_credential(&issuer.did, "urn:example:vc:tampered"));
    tampered["credentialSubject"]["id"] = json!("did:example:mallory");
    let unsigned = v1_credential(&issuer.did, "urn:example:vc:unsigned");

    let vp = envelope(&holder, vec![good, tampered, unsigned]);
    let options = PresentationOptions {
        unsigned: true,
        ..PresentationOptions::default()
    };
    let response = h.presentations().verify_presentation(vp, &[], &options).await;

    assert_eq!(response.signature(), Some(PresentationSignature::Unsigned));
    let results = response.credential_results();
    assert!(!results[0].is_fatal());
    assert_eq!(results[1].errors()[0].name, ErrorName::InvalidSignature);
    assert_eq!(results[2].errors()[0].name, ErrorName::NoProof);
}

#[tokio::test]
async fn test_shared_status_checker() {
    let h = Harness::new();
    h.fetcher.insert_json(
        LIST_URL,
        &status_list_credential(LIST_URL, "revocation", &bitstring_with(&[2])),
    );
    let issuer = Signer::did_key();
    let holder = Signer::did_key();

    let mut revoked = v2_credential(&issuer.did, "urn:example:vc:revoked");
    revoked["credentialStatus"] = bitstring_status(LIST_URL, 2);
    let mut active = v2_credential(&issuer.did, "urn:example:vc:active");
    active["credentialStatus"] = bitstring_status(LIST_URL, 3);
    let plain = v2_credential(&issuer.did, "urn:example:vc:plain");

    let vp = envelope(
        &holder,
        vec![issuer.sign(&revoked), issuer.sign(&active), issuer.sign(&plain)],
    );
    let options = PresentationOptions {
        unsigned: true,
        ..PresentationOptions::default()
    };
    let response = h.presentations().verify_presentation(vp, &[], &options).await;

    let status = |n: usize| {
        response.credential_results()[n]
            .step(REVOCATION_STATUS_STEP_ID)
            .and_then(|s| s.valid)
    };
    assert_eq!(status(0), Some(false));
    assert_eq!(status(1), Some(true));
    assert_eq!(status(2), None);
}

#[tokio::test]
async fn test_single_embedded_credential_object() {
    let h = Harness::new();
    let issuer = Signer::did_key();
    let holder = Signer::did_key();
    let mut vp = envelope(&holder, vec![]);
    vp["verifiableCredential"] = issuer.sign(&v2_credential(&issuer.did, "urn:example:vc:solo"));

    let response = h
        .presentations()
        .verify_presentation(
            vp,
            &[],
            &PresentationOptions {
                unsigned: true,
                ..PresentationOptions::default()
            },
        )
        .await;
    assert_eq!(credential_ids(&response), vec!["urn:example:vc:solo"]);
}

#[tokio::test]
async fn test_envelope_without_context_is_presentation_error() {
    let h = Harness::new();
    let holder = Signer::did_key();
    let mut vp = envelope(&holder, vec![]);
    vp.as_object_mut().unwrap().remove("@context");

    let response = h
        .presentations()
        .verify_presentation(vp, &[], &PresentationOptions::default())
        .await;
    match response {
        PresentationVerificationResponse::Fatal { errors } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].name, ErrorName::PresentationError);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}
