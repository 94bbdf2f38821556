//! Verifier configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Full configuration for the verifier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Schema conformance settings.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Known issuer registries, consulted in order.
    #[serde(default)]
    pub registries: Vec<RegistryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Upper bound for any single fetch, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Schema inference table. Each entry maps an Open Badges credential
/// family and data model version to the schema assumed for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Infer a schema when a credential names none.
    #[serde(default = "default_true")]
    pub infer_schemas: bool,
    #[serde(default = "default_achievement_schema")]
    pub ob_v1_achievement: String,
    #[serde(default = "default_endorsement_schema")]
    pub ob_v1_endorsement: String,
    #[serde(default = "default_achievement_schema")]
    pub ob_v2_achievement: String,
    #[serde(default = "default_endorsement_schema")]
    pub ob_v2_endorsement: String,
}

/// Kind of trust registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegistryKind {
    /// OpenID Federation trust anchor.
    #[serde(rename = "oidf")]
    Oidf,
    /// Flat JSON manifest keyed by issuer DID.
    #[serde(rename = "dcc-legacy")]
    #[default]
    DccLegacy,
    /// Any type this verifier does not know how to query.
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oidf => "oidf",
            Self::DccLegacy => "dcc-legacy",
            Self::Unknown => "unknown",
        }
    }
}

/// One entry of the known-registries list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Display name, echoed in lookup results.
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RegistryKind,
    /// Manifest URL for legacy registries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Entity configuration URL of an OpenID Federation trust anchor.
    #[serde(
        rename = "trustAnchorEC",
        alias = "trustAnchorEndpoint",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub trust_anchor_ec: Option<String>,
}

impl RegistryConfig {
    pub fn legacy(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RegistryKind::DccLegacy,
            url: Some(url.into()),
            trust_anchor_ec: None,
        }
    }

    pub fn oidf(name: impl Into<String>, trust_anchor_ec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RegistryKind::Oidf,
            url: None,
            trust_anchor_ec: Some(trust_anchor_ec.into()),
        }
    }

    /// The URL this registry is loaded from, preferring the trust anchor
    /// for federation registries. Empty when neither is configured.
    pub fn endpoint(&self) -> &str {
        let preferred = match self.kind {
            RegistryKind::Oidf => self.trust_anchor_ec.as_deref().or(self.url.as_deref()),
            _ => self.url.as_deref().or(self.trust_anchor_ec.as_deref()),
        };
        preferred.unwrap_or_default()
    }
}

// Default value functions
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("credverify/", env!("CARGO_PKG_VERSION")).into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_true() -> bool {
    true
}
fn default_achievement_schema() -> String {
    "https://purl.imsglobal.org/spec/ob/v3p0/schema/json/ob_v3p0_achievementcredential_schema.json"
        .into()
}
fn default_endorsement_schema() -> String {
    "https://purl.imsglobal.org/spec/ob/v3p0/schema/json/ob_v3p0_endorsementcredential_schema.json"
        .into()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            infer_schemas: true,
            ob_v1_achievement: default_achievement_schema(),
            ob_v1_endorsement: default_endorsement_schema(),
            ob_v2_achievement: default_achievement_schema(),
            ob_v2_endorsement: default_endorsement_schema(),
        }
    }
}

impl VerifierConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VerifierConfig =
                toml::from_str(&contents).map_err(|e| CoreError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Read a JSON array of registry entries, as published alongside
    /// wallet and verifier deployments.
    pub fn load_registries_json(path: &Path) -> Result<Vec<RegistryConfig>, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        let registries: Vec<RegistryConfig> = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), count = registries.len(), "loaded registry list");
        Ok(registries)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs)
    }
}
