//! Trust registry lookup.
//!
//! [`RegistryCache`] loads the configured registries once and answers
//! issuer lookups from memory. Registries that cannot be loaded or queried
//! are reported as unchecked rather than failing the lookup.

use std::sync::Arc;

use credverify_core::{
    MatchingIssuer, RegistryConfig, RegistryKind, RegistryLookup, RegistryRef, UncheckedRegistry,
};
use credverify_network::HttpFetcher;
use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::error::CredentialError;
use crate::federation::TrustAnchor;

/// One configured registry after loading.
#[derive(Debug, Clone)]
enum LoadedSource {
    /// Flat `{"registry": {"<did>": {...}}}` manifest.
    Legacy {
        config: RegistryConfig,
        issuers: Map<String, Value>,
    },
    Federation {
        config: RegistryConfig,
        anchor: TrustAnchor,
    },
    Unavailable(UncheckedRegistry),
}

/// A loaded registry set, in configuration order.
#[derive(Debug)]
pub struct LoadedRegistries {
    config: Vec<RegistryConfig>,
    sources: Vec<LoadedSource>,
}

impl LoadedRegistries {
    pub fn config(&self) -> &[RegistryConfig] {
        &self.config
    }

    /// Names of registries that could not be loaded.
    pub fn unavailable(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter_map(|s| match s {
                LoadedSource::Unavailable(u) => Some(u.name.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Process-wide registry cache.
pub struct RegistryCache {
    fetcher: Arc<dyn HttpFetcher>,
    state: RwLock<Option<Arc<LoadedRegistries>>>,
    load_lock: Mutex<()>,
}

impl RegistryCache {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            fetcher,
            state: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Load `registries` unless that exact configuration is already loaded.
    pub async fn load(&self, registries: &[RegistryConfig]) -> Arc<LoadedRegistries> {
        if let Some(loaded) = self.current_for(registries).await {
            return loaded;
        }
        let _guard = self.load_lock.lock().await;
        // Another task may have finished loading while we waited.
        if let Some(loaded) = self.current_for(registries).await {
            return loaded;
        }
        self.swap_in(registries).await
    }

    /// Load `registries` unconditionally and replace the cached set.
    pub async fn reload(&self, registries: &[RegistryConfig]) -> Arc<LoadedRegistries> {
        let _guard = self.load_lock.lock().await;
        self.swap_in(registries).await
    }

    /// Look `issuer` up in every configured registry.
    pub async fn lookup(&self, issuer: &str, registries: &[RegistryConfig]) -> RegistryLookup {
        let loaded = self.load(registries).await;
        let answers = join_all(
            loaded
                .sources
                .iter()
                .map(|source| self.lookup_in(source, issuer)),
        )
        .await;

        let mut lookup = RegistryLookup::default();
        for answer in answers {
            match answer {
                Answer::Listed(m) => lookup.matching_issuers.push(m),
                Answer::NotListed => {}
                Answer::Unchecked(u) => lookup.unchecked_registries.push(u),
            }
        }
        tracing::debug!(
            issuer,
            matches = lookup.matching_issuers.len(),
            unchecked = lookup.unchecked_registries.len(),
            "registry lookup"
        );
        lookup
    }

    async fn current_for(&self, registries: &[RegistryConfig]) -> Option<Arc<LoadedRegistries>> {
        self.state
            .read()
            .await
            .as_ref()
            .filter(|loaded| loaded.config == registries)
            .cloned()
    }

    async fn swap_in(&self, registries: &[RegistryConfig]) -> Arc<LoadedRegistries> {
        let sources = join_all(registries.iter().map(|config| self.load_source(config))).await;
        let loaded = Arc::new(LoadedRegistries {
            config: registries.to_vec(),
            sources,
        });
        tracing::info!(
            registries = registries.len(),
            unavailable = loaded.unavailable().len(),
            "trust registries loaded"
        );
        *self.state.write().await = Some(loaded.clone());
        loaded
    }

    async fn load_source(&self, config: &RegistryConfig) -> LoadedSource {
        let result = match config.kind {
            RegistryKind::DccLegacy => self.load_legacy(config).await,
            RegistryKind::Oidf => {
                TrustAnchor::load(&self.fetcher, &config.name, config.endpoint())
                    .await
                    .map(|anchor| LoadedSource::Federation {
                        config: config.clone(),
                        anchor,
                    })
            }
            RegistryKind::Unknown => Err(CredentialError::Registry {
                name: config.name.clone(),
                message: "unknown registry type".into(),
            }),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(registry = %config.name, error = %e, "registry unavailable");
            LoadedSource::Unavailable(unchecked(config))
        })
    }

    async fn load_legacy(&self, config: &RegistryConfig) -> Result<LoadedSource, CredentialError> {
        let manifest = self.fetcher.fetch_json(config.endpoint()).await?;
        let issuers = manifest
            .get("registry")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| CredentialError::Registry {
                name: config.name.clone(),
                message: "manifest has no registry object".into(),
            })?;
        Ok(LoadedSource::Legacy {
            config: config.clone(),
            issuers,
        })
    }

    async fn lookup_in(&self, source: &LoadedSource, issuer: &str) -> Answer {
        match source {
            LoadedSource::Legacy { config, issuers } => match issuers.get(issuer) {
                Some(info) => Answer::Listed(matching(config, info.clone())),
                None => Answer::NotListed,
            },
            LoadedSource::Federation { config, anchor } => {
                match anchor.lookup(&self.fetcher, issuer).await {
                    Ok(Some(info)) => Answer::Listed(matching(config, info)),
                    Ok(None) => Answer::NotListed,
                    Err(e) => {
                        tracing::warn!(registry = %config.name, error = %e, "federation lookup failed");
                        Answer::Unchecked(unchecked(config))
                    }
                }
            }
            LoadedSource::Unavailable(u) => Answer::Unchecked(u.clone()),
        }
    }
}

enum Answer {
    Listed(MatchingIssuer),
    NotListed,
    Unchecked(UncheckedRegistry),
}

fn matching(config: &RegistryConfig, issuer: Value) -> MatchingIssuer {
    MatchingIssuer {
        issuer,
        registry: RegistryRef {
            name: config.name.clone(),
            kind: config.kind,
            url: config.endpoint().to_string(),
        },
    }
}

fn unchecked(config: &RegistryConfig) -> UncheckedRegistry {
    UncheckedRegistry {
        name: config.name.clone(),
        url: config.endpoint().to_string(),
    }
}
