/*============================================================
  Synavera Project: Houdini-Build
  Module: houdini_build_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Houdini-Build. Resolves the Houdini build
    to package, skips builds whose image tag is already
    published, downloads the installer artifacts and hands the
    build identity to later CI steps.

  Security / Safety Notes:
    Client credentials arrive as arguments from the CI secret
    store and are only forwarded to the vendor token endpoint.
    Executes the registry CLI and performs HTTPS requests.

  Dependencies:
    clap for CLI parsing, chrono for session stamps.

  Operational Scope:
    Invoked by the image workflow before the docker build job.

  Revision History:
    2025-11-12 COD  Authored Houdini-Build runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod build_info;
mod builder;
mod catalog;
mod config;
mod error;
mod fetch;
mod logger;
mod output;
mod registry;
mod release;
mod version;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use builder::{check_build_can_be_installed, BuildOptions};
use catalog::SidefxClient;
use config::BuildConfig;
use error::{BuildError, Result};
use fetch::Downloader;
use logger::Logger;
use output::write_github_output;
use registry::DockerRegistry;

/// Command-line arguments for Houdini-Build.
#[derive(Debug, Parser)]
#[command(
    name = "Houdini-Build",
    version,
    author = "Synavera Systems",
    about = "Resolve and fetch the Houdini build for the next image"
)]
struct Cli {
    /// Version hint: empty, `major.minor` or `major.minor.build`.
    version: String,
    /// Image repository (`user/repo`) the tag is checked against.
    tag: String,
    /// SideFX API client id.
    client_id: String,
    /// SideFX API client secret.
    client_secret: String,
    /// Build even if the image tag already exists.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the dockerfiles root directory.
    #[arg(long, value_name = "PATH")]
    dockerfiles: Option<PathBuf>,
    /// CI output file receiving the build identity.
    #[arg(long, value_name = "PATH", env = "GITHUB_OUTPUT")]
    github_output: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Houdini-Build] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = BuildConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli.log.clone().or_else(|| {
        config
            .log_dir()
            .map(|dir| dir.join(format!("build_{session_stamp}.log")))
    });
    let logger = Logger::new(log_path, cli.verbose)?;
    logger.info("INIT", "Houdini-Build starting.");

    let outcome = execute(&cli, &config, &logger).await;
    if let Err(err) = &outcome {
        logger.error("FAILED", err.to_string());
    }
    logger.finalize()?;
    outcome
}

async fn execute(cli: &Cli, config: &BuildConfig, logger: &Logger) -> Result<ExitCode> {
    let dockerfiles_dir = match &cli.dockerfiles {
        Some(dir) => dir.clone(),
        None => config.dockerfiles_dir()?,
    };
    let options = BuildOptions {
        force: cli.force,
        dockerfiles_dir,
        supported_versions: config.build.supported_versions.clone(),
    };

    let catalog = SidefxClient::connect(&config.api, &cli.client_id, &cli.client_secret).await?;
    logger.debug("AUTH", format!("Authorized against {}", config.api.endpoint_url));
    let registry = DockerRegistry::new(config.registry.command.clone());
    let downloader = Downloader::new(&config.api.user_agent)?;

    let result = check_build_can_be_installed(
        &catalog,
        &registry,
        &downloader,
        &cli.version,
        &cli.tag,
        &options,
        logger,
    )
    .await?;

    let Some(result) = result else {
        logger.info("COMPLETE", "Nothing to build.");
        return Ok(ExitCode::SUCCESS);
    };

    let output_path = cli.github_output.as_deref().ok_or_else(|| {
        BuildError::Config("GITHUB_OUTPUT is not set; pass --github-output".into())
    })?;
    write_github_output(&result, output_path)?;
    logger.info(
        "OUTPUT",
        format!(
            "build_full_version={} written to {}",
            result.full_version(),
            output_path.display()
        ),
    );
    logger.info("COMPLETE", "Artifacts ready.");

    Ok(ExitCode::SUCCESS)
}
