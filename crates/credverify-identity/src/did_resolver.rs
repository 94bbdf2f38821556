use std::sync::Arc;

use async_trait::async_trait;
use credverify_crypto::PublicKey;
use credverify_network::HttpFetcher;

use crate::did::{did_web_url, Did};
use crate::document::DidDocument;
use crate::error::IdentityError;

/// Trait for resolving DIDs to their documents.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve a DID URI to its DID Document.
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError>;

    /// Resolve a verification method URL (`did:...#fragment`) to its key.
    async fn resolve_verification_method(&self, vm_id: &str) -> Result<PublicKey, IdentityError> {
        let did = Did::parse(vm_id)?;
        let document = self.resolve(&did.to_string()).await?;
        document
            .find_method(vm_id)
            .ok_or_else(|| IdentityError::VerificationMethodNotFound(vm_id.to_string()))?
            .public_key()
    }
}

/// Resolves `did:key` identifiers offline; the key is the identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct DidKeyResolver;

#[async_trait]
impl DidResolver for DidKeyResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError> {
        let parsed = Did::parse(did)?;
        if parsed.method() != "key" {
            return Err(IdentityError::UnsupportedMethod(parsed.method().to_string()));
        }
        let multibase = parsed.method_specific_id();
        let key = PublicKey::from_multibase(multibase)?;
        let id = parsed.to_string();
        let vm_id = format!("{}#{}", id, multibase);
        Ok(DidDocument::with_ed25519(id, vm_id, &key))
    }
}

/// Resolves `did:web` identifiers by fetching `did.json` over HTTPS.
pub struct DidWebResolver {
    fetcher: Arc<dyn HttpFetcher>,
}

impl DidWebResolver {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl DidResolver for DidWebResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError> {
        let parsed = Did::parse(did)?;
        if !parsed.is_web() {
            return Err(IdentityError::UnsupportedMethod(parsed.method().to_string()));
        }
        let url = did_web_url(did)?;
        let body = self
            .fetcher
            .fetch_json(&url)
            .await
            .map_err(|source| IdentityError::KeyRetrieval {
                url: url.clone(),
                source,
            })?;
        let document: DidDocument = serde_json::from_value(body)
            .map_err(|e| IdentityError::MalformedDocument(format!("{}: {}", url, e)))?;
        if document.id != parsed.to_string() {
            return Err(IdentityError::MalformedDocument(format!(
                "document at {} describes {}, expected {}",
                url, document.id, parsed
            )));
        }
        tracing::debug!(did = %parsed, url = %url, "resolved did:web document");
        Ok(document)
    }
}

/// Composite resolver that tries multiple resolvers in order.
///
/// Returns the first successful resolution. On failure, the most specific
/// error wins: a resolver that does not handle the method never masks the
/// failure of one that does.
pub struct CompositeDidResolver {
    resolvers: Vec<Box<dyn DidResolver>>,
}

impl CompositeDidResolver {
    /// Create a new composite resolver with no backends.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// `did:key` and `did:web` over the given fetcher.
    pub fn with_defaults(fetcher: Arc<dyn HttpFetcher>) -> Self {
        let mut composite = Self::new();
        composite.add_resolver(Box::new(DidKeyResolver));
        composite.add_resolver(Box::new(DidWebResolver::new(fetcher)));
        composite
    }

    /// Add a resolver to the chain.
    pub fn add_resolver(&mut self, resolver: Box<dyn DidResolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of registered resolvers.
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

impl Default for CompositeDidResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DidResolver for CompositeDidResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument, IdentityError> {
        let mut last_error: Option<IdentityError> = None;

        for resolver in &self.resolvers {
            match resolver.resolve(did).await {
                Ok(doc) => return Ok(doc),
                Err(e) => {
                    tracing::debug!(did = did, error = %e, "resolver failed, trying next");
                    let unsupported = matches!(e, IdentityError::UnsupportedMethod(_));
                    if !unsupported || last_error.is_none() {
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| IdentityError::DidResolution("no resolvers configured".into())))
    }
}
