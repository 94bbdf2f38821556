use std::fmt;

use crate::error::IdentityError;

/// A parsed DID: `did:<method>:<method-specific-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    method_specific_id: String,
}

impl Did {
    /// Parse a DID, dropping any DID URL fragment, query or path.
    pub fn parse(input: &str) -> Result<Self, IdentityError> {
        let bare = input
            .split(['#', '?'])
            .next()
            .unwrap_or_default();
        let mut parts = bare.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("did"), Some(method), Some(id))
                if !method.is_empty()
                    && method.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                    && !id.is_empty() =>
            {
                Ok(Self {
                    method: method.to_string(),
                    method_specific_id: id.to_string(),
                })
            }
            _ => Err(IdentityError::InvalidDid(input.to_string())),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn method_specific_id(&self) -> &str {
        &self.method_specific_id
    }

    pub fn is_web(&self) -> bool {
        self.method == "web"
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.method_specific_id)
    }
}

/// The URL a `did:web` DID document is published at.
///
/// `did:web:example.com` maps to `https://example.com/.well-known/did.json`;
/// further colon-separated segments become a path, and a percent-encoded
/// port (`%3A`) is decoded. `localhost` is served over plain http.
pub fn did_web_url(did: &str) -> Result<String, IdentityError> {
    let bare = did.split(['#', '?']).next().unwrap_or_default();
    let mut parts = bare.split(':').peekable();
    let domain_name = match (parts.next(), parts.next(), parts.next()) {
        (Some("did"), Some("web"), Some(domain_name)) if !domain_name.is_empty() => domain_name,
        _ => return Err(IdentityError::InvalidDid(did.to_string())),
    };
    let path = match parts.peek() {
        Some(_) => parts.collect::<Vec<&str>>().join("/"),
        None => ".well-known".to_string(),
    };
    let proto = if domain_name.starts_with("localhost") {
        "http"
    } else {
        "https"
    };
    Ok(format!(
        "{}://{}/{}/did.json",
        proto,
        domain_name.replacen("%3A", ":", 1),
        path
    ))
}
