//! JSON Schema conformance checks.
//!
//! Schemas come from `credentialSchema`, or are inferred for Open Badges
//! credentials from their type and data model version. Conformance is
//! informational: nothing here can make a credential fatally invalid.

use std::sync::Arc;

use credverify_core::{
    Credential, SchemaCheckResult, SchemaConfig, SchemaProvenance, SchemaResults, SchemaSentinel,
    SchemaValidation, SchemaViolation, VcVersion,
};
use credverify_network::HttpFetcher;
use dashmap::DashMap;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use crate::error::CredentialError;

pub const OPEN_BADGES_CONTEXT_PREFIX: &str = "https://purl.imsglobal.org/spec/ob/v3p0/context";
pub const EXPLICIT_SCHEMA_SOURCE: &str = "Specified in vc.credentialSchema";

/// A compiled schema ready to validate documents.
pub trait CompiledSchema: Send + Sync {
    fn validate(&self, document: &Value) -> SchemaValidation;
}

/// Compiles schema documents.
pub trait SchemaValidator: Send + Sync {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, CredentialError>;
}

/// [`SchemaValidator`] backed by the `jsonschema` crate. The draft is taken
/// from the schema's `$schema`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaValidator;

/// Refuses every `$ref` that is not part of the compiled document, so
/// compilation never performs blocking I/O.
struct NoRemoteRefs;

impl Retrieve for NoRemoteRefs {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("remote reference {} is not retrieved", uri.as_str()).into())
    }
}

struct JsonSchema(Validator);

impl CompiledSchema for JsonSchema {
    fn validate(&self, document: &Value) -> SchemaValidation {
        let violations = self
            .0
            .iter_errors(document)
            .map(|e| SchemaViolation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        SchemaValidation::from_violations(violations)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, CredentialError> {
        let mut opts = jsonschema::options();
        opts.with_retriever(NoRemoteRefs);
        let validator = opts.build(schema).map_err(|e| CredentialError::Schema {
            url: schema
                .get("$id")
                .and_then(Value::as_str)
                .unwrap_or("<inline>")
                .to_string(),
            message: e.to_string(),
        })?;
        Ok(Arc::new(JsonSchema(validator)))
    }
}

/// Credential families with an inferable schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredFamily {
    Achievement,
    Endorsement,
}

impl InferredFamily {
    fn for_type(credential_type: &str) -> Option<Self> {
        match credential_type {
            "OpenBadgeCredential" | "AchievementCredential" => Some(Self::Achievement),
            "EndorsementCredential" => Some(Self::Endorsement),
            _ => None,
        }
    }
}

/// Resolves, fetches, compiles and applies the schemas for a credential.
pub struct SchemaResolver {
    fetcher: Arc<dyn HttpFetcher>,
    validator: Arc<dyn SchemaValidator>,
    cache: DashMap<String, Arc<dyn CompiledSchema>>,
    config: SchemaConfig,
}

impl SchemaResolver {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        validator: Arc<dyn SchemaValidator>,
        config: SchemaConfig,
    ) -> Self {
        Self {
            fetcher,
            validator,
            cache: DashMap::new(),
            config,
        }
    }

    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }

    /// Check the credential against every applicable schema.
    pub async fn check_schemas(&self, credential: &Credential) -> SchemaResults {
        if credential.has_schema() {
            return self.check_explicit(credential).await;
        }
        match self.infer(credential) {
            Some((url, source)) => match self.compiled(&url).await {
                Ok(schema) => SchemaResults::Checked(vec![SchemaCheckResult {
                    schema: url,
                    provenance: SchemaProvenance::Inferred,
                    source,
                    result: schema.validate(credential.as_value()),
                }]),
                Err(e) => {
                    tracing::warn!(schema = %url, error = %e, "inferred schema unusable");
                    SchemaResults::Sentinel(SchemaSentinel::InvalidSchema)
                }
            },
            None => SchemaResults::Sentinel(SchemaSentinel::NoSchema),
        }
    }

    async fn check_explicit(&self, credential: &Credential) -> SchemaResults {
        let refs = match credential.schema_refs() {
            Ok(refs) if !refs.is_empty() => refs,
            Ok(_) => return SchemaResults::Sentinel(SchemaSentinel::NoSchema),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable credentialSchema");
                return SchemaResults::Sentinel(SchemaSentinel::InvalidSchema);
            }
        };

        let mut results = Vec::with_capacity(refs.len());
        for schema_ref in refs {
            match self.compiled(&schema_ref.id).await {
                Ok(schema) => results.push(SchemaCheckResult {
                    schema: schema_ref.id,
                    provenance: SchemaProvenance::Explicit,
                    source: EXPLICIT_SCHEMA_SOURCE.to_string(),
                    result: schema.validate(credential.as_value()),
                }),
                Err(e) => {
                    tracing::warn!(schema = %schema_ref.id, error = %e, "credential schema unusable");
                    return SchemaResults::Sentinel(SchemaSentinel::InvalidSchema);
                }
            }
        }
        SchemaResults::Checked(results)
    }

    /// The inferred schema URL and its provenance text.
    fn infer(&self, credential: &Credential) -> Option<(String, String)> {
        if !self.config.infer_schemas {
            return None;
        }
        let is_open_badge = credential
            .context_uris()
            .iter()
            .any(|uri| uri.starts_with(OPEN_BADGES_CONTEXT_PREFIX));
        if !is_open_badge {
            return None;
        }
        let version = credential.version()?;
        let (credential_type, family) = credential
            .types()
            .into_iter()
            .find_map(|t| InferredFamily::for_type(t).map(|f| (t, f)))?;

        let url = match (family, version) {
            (InferredFamily::Achievement, VcVersion::V1) => &self.config.ob_v1_achievement,
            (InferredFamily::Achievement, VcVersion::V2) => &self.config.ob_v2_achievement,
            (InferredFamily::Endorsement, VcVersion::V1) => &self.config.ob_v1_endorsement,
            (InferredFamily::Endorsement, VcVersion::V2) => &self.config.ob_v2_endorsement,
        };
        let source = format!(
            "Assumed based on vc.type: '{}' and vc version: 'version {}'",
            credential_type,
            version.number()
        );
        Some((url.clone(), source))
    }

    async fn compiled(&self, url: &str) -> Result<Arc<dyn CompiledSchema>, CredentialError> {
        if let Some(schema) = self.cache.get(url) {
            return Ok(schema.value().clone());
        }
        let document = self.fetcher.fetch_json(url).await?;
        let schema = self.validator.compile(&document)?;
        self.cache.insert(url.to_string(), schema.clone());
        Ok(schema)
    }
}
