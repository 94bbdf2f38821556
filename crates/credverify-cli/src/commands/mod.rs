pub mod credential;
pub mod init;
pub mod presentation;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use credverify_core::{RegistryConfig, VerifierConfig};
use credverify_credentials::CredentialVerifier;
use credverify_network::HttpClientFetcher;
use serde_json::Value;

/// Settings shared by the verification commands.
pub struct Context {
    pub config: VerifierConfig,
    pub registries: Vec<RegistryConfig>,
    pub reload_registries: bool,
}

impl Context {
    pub fn verifier(&self) -> anyhow::Result<CredentialVerifier> {
        let fetcher = HttpClientFetcher::from_config(&self.config.http)
            .context("failed to build HTTP client")?;
        Ok(CredentialVerifier::builder(Arc::new(fetcher))
            .schema_config(self.config.schema.clone())
            .build())
    }
}

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub fn print_report<T: serde::Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
