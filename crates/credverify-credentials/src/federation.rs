//! OpenID Federation trust anchors.
//!
//! Entity statements are compact JWTs. Only their payloads are read; the
//! JWS signatures are not checked.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use credverify_network::HttpFetcher;
use serde_json::Value;

use crate::error::CredentialError;

/// A loaded trust anchor, ready for subordinate lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustAnchor {
    entity_id: Option<String>,
    fetch_endpoint: String,
}

impl TrustAnchor {
    /// Fetch the trust anchor's entity configuration and read its fetch
    /// endpoint.
    pub async fn load(
        fetcher: &Arc<dyn HttpFetcher>,
        name: &str,
        entity_configuration_url: &str,
    ) -> Result<Self, CredentialError> {
        let jwt = fetcher.fetch_text(entity_configuration_url).await?;
        let payload = decode_jwt_payload(&jwt).map_err(|message| CredentialError::Registry {
            name: name.to_string(),
            message,
        })?;
        let fetch_endpoint = payload
            .pointer("/metadata/federation_entity/federation_fetch_endpoint")
            .and_then(Value::as_str)
            .ok_or_else(|| CredentialError::Registry {
                name: name.to_string(),
                message: "entity configuration has no federation_fetch_endpoint".into(),
            })?
            .to_string();
        Ok(Self {
            entity_id: payload.get("sub").and_then(Value::as_str).map(str::to_string),
            fetch_endpoint,
        })
    }

    pub fn fetch_endpoint(&self) -> &str {
        &self.fetch_endpoint
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// The issuer's subordinate statement, reduced to its published entity
    /// information. `Ok(None)` when the anchor does not list the issuer.
    pub async fn lookup(
        &self,
        fetcher: &Arc<dyn HttpFetcher>,
        issuer: &str,
    ) -> Result<Option<Value>, CredentialError> {
        let mut url = url::Url::parse(&self.fetch_endpoint).map_err(|e| {
            CredentialError::Internal(format!(
                "invalid fetch endpoint {}: {}",
                self.fetch_endpoint, e
            ))
        })?;
        url.query_pairs_mut().append_pair("sub", issuer);

        let body = match fetcher.fetch_text(url.as_str()).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let statement = match decode_jwt_payload(&body) {
            Ok(payload) => payload,
            Err(_) => serde_json::from_str(&body).map_err(|e| {
                CredentialError::Internal(format!("unreadable subordinate statement: {}", e))
            })?,
        };
        let info = statement
            .pointer("/metadata/federation_entity")
            .cloned()
            .unwrap_or(statement);
        Ok(Some(info))
    }
}

/// Decode the payload of a compact JWS without checking its signature.
pub fn decode_jwt_payload(jwt: &str) -> Result<Value, String> {
    let mut parts = jwt.trim().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err("not a compact JWT".to_string()),
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| format!("JWT payload is not base64url: {}", e))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("JWT payload is not JSON: {}", e))
}

/// Build an unsigned compact JWT around `payload`. Test fixture helper.
#[cfg(test)]
pub(crate) fn unsigned_jwt(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"entity-statement+jwt"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.sig", header, body)
}
