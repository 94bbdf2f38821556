//! `credverify credential`: Verify a single credential.

use std::path::PathBuf;

use clap::Args;
use credverify_credentials::VerifyOptions;

use super::{print_report, read_document, Context};

#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Credential JSON file, or `-` for stdin.
    pub file: PathBuf,
}

/// Returns whether the report is fatal.
pub async fn run(ctx: &Context, args: &CredentialArgs) -> anyhow::Result<bool> {
    let credential = read_document(&args.file)?;
    let verifier = ctx.verifier()?;
    let options = VerifyOptions {
        reload_registries: ctx.reload_registries,
    };

    let report = verifier
        .verify_credential_with(credential, &ctx.registries, options)
        .await;
    print_report(&report)?;
    Ok(report.is_fatal())
}
