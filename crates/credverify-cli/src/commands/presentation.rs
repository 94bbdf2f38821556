//! `credverify presentation`: Verify a presentation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use credverify_credentials::{PresentationOptions, PresentationVerifier};

use super::{print_report, read_document, Context};

#[derive(Args, Debug)]
pub struct PresentationArgs {
    /// Presentation JSON file, or `-` for stdin.
    pub file: PathBuf,

    /// Challenge the holder proof must carry.
    #[arg(long)]
    pub challenge: Option<String>,

    /// Domain the holder proof must carry.
    #[arg(long)]
    pub domain: Option<String>,

    /// Do not check the holder proof.
    #[arg(long)]
    pub unsigned: bool,
}

/// Returns whether the report is fatal.
pub async fn run(ctx: &Context, args: &PresentationArgs) -> anyhow::Result<bool> {
    let presentation = read_document(&args.file)?;
    let verifier = PresentationVerifier::new(Arc::new(ctx.verifier()?));
    let options = PresentationOptions {
        challenge: args.challenge.clone(),
        domain: args.domain.clone(),
        unsigned: args.unsigned,
        reload_registries: ctx.reload_registries,
    };

    let report = verifier
        .verify_presentation(presentation, &ctx.registries, &options)
        .await;
    print_report(&report)?;
    Ok(report.is_fatal())
}
