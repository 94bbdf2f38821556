//! Credverify CLI: verify Verifiable Credentials and Presentations.
//!
//! Subcommands: init, credential, presentation.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use credverify_core::{LoggingConfig, VerifierConfig};
use tracing_subscriber::EnvFilter;

/// Credverify: Verifiable Credential verification.
#[derive(Parser, Debug)]
#[command(name = "credverify", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "credverify.toml")]
    config: PathBuf,

    /// Known registries as a JSON array of {name, type, url | trustAnchorEC}.
    /// Replaces the registries in the configuration file.
    #[arg(short, long, global = true)]
    registries: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Reload every registry before looking issuers up.
    #[arg(long, global = true)]
    reload_registries: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Verify a single credential.
    Credential(commands::credential::CredentialArgs),
    /// Verify a presentation and the credentials it carries.
    Presentation(commands::presentation::PresentationArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Commands::Init(args) = &cli.command {
        init_logging(&LoggingConfig::default(), cli.log_level.as_deref());
        commands::init::run(&cli.config, args)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = VerifierConfig::load(&cli.config)?;
    init_logging(&config.logging, cli.log_level.as_deref());

    let registries = match &cli.registries {
        Some(path) => VerifierConfig::load_registries_json(path)?,
        None => config.registries.clone(),
    };
    let ctx = commands::Context {
        config,
        registries,
        reload_registries: cli.reload_registries,
    };

    let fatal = match &cli.command {
        Commands::Init(_) => false,
        Commands::Credential(args) => commands::credential::run(&ctx, args).await?,
        Commands::Presentation(args) => commands::presentation::run(&ctx, args).await?,
    };
    Ok(if fatal {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Logs go to stderr so the report on stdout stays machine-readable.
fn init_logging(logging: &LoggingConfig, override_level: Option<&str>) {
    let level = override_level.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
