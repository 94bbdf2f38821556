//! `credverify init`: Write a default configuration file.

use std::path::Path;

use clap::Args;
use credverify_core::{RegistryConfig, VerifierConfig};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,

    /// Add a legacy registry entry as a starting point.
    #[arg(long)]
    pub example_registry: bool,
}

pub fn run(path: &Path, args: &InitArgs) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = default_config(args.example_registry);
    config.save(path)?;
    tracing::info!(path = %path.display(), "wrote default config");
    println!("Wrote {}", path.display());
    Ok(())
}

fn default_config(example_registry: bool) -> VerifierConfig {
    let mut config = VerifierConfig::default();
    if example_registry {
        config.registries.push(RegistryConfig::legacy(
            "DCC Sandbox Registry",
            "https://digitalcredentials.github.io/sandbox-registry/registry.json",
        ));
    }
    config
}
