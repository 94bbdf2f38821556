use std::sync::Arc;

use credverify_core::{
    AdditionalInformation, Credential, RegistryConfig, SchemaConfig, VerificationResponse,
    VerificationStep,
};
use credverify_identity::{CompositeDidResolver, DidResolver};
use credverify_network::HttpFetcher;
use credverify_proof::{DataIntegrityEngine, EddsaJcs2022, ProofEngine, ProofSuite, StatusCheck};

use crate::classifier::{classify, Classified};
use crate::dispatcher::SignatureDispatcher;
use crate::precondition;
use crate::registry::RegistryCache;
use crate::schema::{JsonSchemaValidator, SchemaResolver, SchemaValidator};
use crate::status::{StatusChecker, StatusResolver};

/// Per-call verification options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Reload every registry before the issuer lookup.
    pub reload_registries: bool,
}

/// Verifies a single credential into a [`VerificationResponse`].
pub struct CredentialVerifier {
    dispatcher: SignatureDispatcher,
    status: StatusResolver,
    registries: Arc<RegistryCache>,
    schemas: SchemaResolver,
}

impl CredentialVerifier {
    /// Default wiring: `did:key` and `did:web` resolution, the
    /// `eddsa-jcs-2022` suite and `jsonschema` validation, all fetching
    /// through `fetcher`.
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self::builder(fetcher).build()
    }

    pub fn builder(fetcher: Arc<dyn HttpFetcher>) -> CredentialVerifierBuilder {
        CredentialVerifierBuilder::new(fetcher)
    }

    pub fn registry_cache(&self) -> &Arc<RegistryCache> {
        &self.registries
    }

    pub fn status_resolver(&self) -> &StatusResolver {
        &self.status
    }

    pub fn dispatcher(&self) -> &SignatureDispatcher {
        &self.dispatcher
    }

    pub async fn verify_credential(
        &self,
        credential: impl Into<Credential>,
        registries: &[RegistryConfig],
    ) -> VerificationResponse {
        self.verify_credential_with(credential, registries, VerifyOptions::default())
            .await
    }

    pub async fn verify_credential_with(
        &self,
        credential: impl Into<Credential>,
        registries: &[RegistryConfig],
        options: VerifyOptions,
    ) -> VerificationResponse {
        let credential = credential.into();
        if options.reload_registries {
            self.registries.reload(registries).await;
        }
        let checker = self.status.select_checker(&credential);
        self.verify_with_status(credential, registries, checker.as_ref())
            .await
    }

    /// Run the pipeline with a status checker chosen by the caller.
    pub(crate) async fn verify_with_status(
        &self,
        credential: Credential,
        registries: &[RegistryConfig],
        status: Option<&StatusChecker>,
    ) -> VerificationResponse {
        tracing::debug!(id = ?credential.id(), "verifying credential");

        // 1. Structure
        if let Some(error) = precondition::check(&credential) {
            tracing::info!(id = ?credential.id(), error = %error.name, "credential rejected");
            return VerificationResponse::fatal(credential.into_value(), error);
        }

        // 2. Signatures, validity period and status
        let raw = self
            .dispatcher
            .verify(&credential, status.map(|s| s as &dyn StatusCheck))
            .await;
        let mut log = match classify(raw, &credential) {
            Classified::Evaluated(log) => log,
            Classified::Fatal(error) => {
                tracing::info!(id = ?credential.id(), error = %error.name, "credential rejected");
                return VerificationResponse::fatal(credential.into_value(), error);
            }
        };

        // 3. Trust registries
        let issuer = credential.issuer_id().unwrap_or_default();
        let lookup = self.registries.lookup(&issuer, registries).await;
        log.push(VerificationStep::registered_issuer(lookup));

        // 4. Schemas (informational)
        let schema_results = self.schemas.check_schemas(&credential).await;

        tracing::info!(
            id = ?credential.id(),
            valid = log.iter().all(VerificationStep::is_valid),
            "credential verified"
        );
        VerificationResponse::Evaluated {
            credential: credential.into_value(),
            log,
            additional_information: vec![AdditionalInformation::schema_check(schema_results)],
        }
    }
}

/// Builder for [`CredentialVerifier`]. Anything not set falls back to the
/// default wiring.
pub struct CredentialVerifierBuilder {
    fetcher: Arc<dyn HttpFetcher>,
    resolver: Option<Arc<dyn DidResolver>>,
    engine: Option<Arc<dyn ProofEngine>>,
    suites: Vec<Arc<dyn ProofSuite>>,
    schema_validator: Option<Arc<dyn SchemaValidator>>,
    schema_config: SchemaConfig,
    registries: Option<Arc<RegistryCache>>,
}

impl CredentialVerifierBuilder {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            fetcher,
            resolver: None,
            engine: None,
            suites: Vec::new(),
            schema_validator: None,
            schema_config: SchemaConfig::default(),
            registries: None,
        }
    }

    /// DID resolver for the default engine. Ignored when an engine is set.
    pub fn resolver(mut self, resolver: Arc<dyn DidResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn engine(mut self, engine: Arc<dyn ProofEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Add a proof suite. Without any, `eddsa-jcs-2022` is used.
    pub fn suite(mut self, suite: Arc<dyn ProofSuite>) -> Self {
        self.suites.push(suite);
        self
    }

    pub fn schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = Some(validator);
        self
    }

    pub fn schema_config(mut self, config: SchemaConfig) -> Self {
        self.schema_config = config;
        self
    }

    /// Share a registry cache between verifiers.
    pub fn registry_cache(mut self, cache: Arc<RegistryCache>) -> Self {
        self.registries = Some(cache);
        self
    }

    pub fn build(self) -> CredentialVerifier {
        let fetcher = self.fetcher;
        let engine = self.engine.unwrap_or_else(|| {
            let resolver = self.resolver.unwrap_or_else(|| {
                Arc::new(CompositeDidResolver::with_defaults(fetcher.clone())) as Arc<dyn DidResolver>
            });
            Arc::new(DataIntegrityEngine::new(resolver)) as Arc<dyn ProofEngine>
        });
        let suites = if self.suites.is_empty() {
            vec![Arc::new(EddsaJcs2022) as Arc<dyn ProofSuite>]
        } else {
            self.suites
        };
        let validator = self
            .schema_validator
            .unwrap_or_else(|| Arc::new(JsonSchemaValidator) as Arc<dyn SchemaValidator>);
        let registries = self
            .registries
            .unwrap_or_else(|| Arc::new(RegistryCache::new(fetcher.clone())));

        CredentialVerifier {
            dispatcher: SignatureDispatcher::new(engine, suites),
            status: StatusResolver::new(fetcher.clone()),
            registries,
            schemas: SchemaResolver::new(fetcher, validator, self.schema_config),
        }
    }
}
