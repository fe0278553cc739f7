//! Pictor CLI: validate, name and store images from local paths or URLs.
//!
//! Settings come from PICTOR_* environment variables (and `.env`); flags override them.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pictor_cli::{init_tracing, log_error, ErrorReport};
use pictor_core::{IngestConfig, PipelineError, SniffStrategy};
use pictor_processing::{Collaborators, ImageIngest, IngestOptions};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pictor", about = "Image ingest pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Local file path or http(s) URL
    origin: String,
    /// Only accept this mime type (e.g. image/png)
    #[arg(long)]
    mime: Option<String>,
    /// Content sniffing strategy: buffer or header
    #[arg(long)]
    strategy: Option<SniffStrategy>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an image and print what was detected
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Validate an image and store it in the upload directory
    Ingest {
        #[command(flatten)]
        source: SourceArgs,
        /// Base name of the stored file (extension is kept)
        #[arg(long)]
        name: Option<String>,
        /// Use the name verbatim instead of slugifying it
        #[arg(long)]
        raw_name: bool,
        /// Existing directory to store into instead of the default upload directory
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Move a local origin instead of copying it
        #[arg(long = "move")]
        move_file: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn construct(
    source: &SourceArgs,
    sanitize: bool,
    config: &IngestConfig,
) -> Result<ImageIngest, PipelineError> {
    let collaborators = Collaborators::from_config(config).map_err(|e| PipelineError::Read {
        origin: source.origin.clone(),
        message: e.to_string(),
    })?;
    let options = IngestOptions {
        mime: source.mime.clone(),
        sanitize,
        strategy: source.strategy.unwrap_or(config.sniff_strategy),
    };
    ImageIngest::construct(&source.origin, options, collaborators).await
}

async fn ingest(
    source: &SourceArgs,
    name: Option<&str>,
    raw_name: bool,
    dir: Option<&PathBuf>,
    move_file: bool,
    config: &IngestConfig,
) -> Result<(ImageIngest, bool), PipelineError> {
    let mut image = construct(source, !raw_name, config).await?;
    if name.is_some() {
        image.set_name(name, !raw_name)?;
    }
    image.set_upload_directory(dir.map(PathBuf::as_path)).await?;

    let stored = if move_file {
        image.move_file().await?
    } else {
        image.save().await?
    };
    Ok((image, stored))
}

/// Run one command; `Ok(false)` means it failed and was reported on stdout.
async fn run(cli: Cli, config: IngestConfig) -> anyhow::Result<bool> {
    let result = match &cli.command {
        Commands::Inspect { source } => construct(source, true, &config)
            .await
            .map(|image| (image, true)),
        Commands::Ingest {
            source,
            name,
            raw_name,
            dir,
            move_file,
        } => {
            ingest(
                source,
                name.as_deref(),
                *raw_name,
                dir.as_ref(),
                *move_file,
                &config,
            )
            .await
        }
    };

    match result {
        Ok((image, stored)) => {
            print_json(&image)?;
            if !stored {
                tracing::error!(origin = %image.origin(), "Image could not be written");
                return Ok(false);
            }
            Ok(true)
        }
        Err(err) => {
            log_error(&err);
            print_json(&ErrorReport::from(&err))?;
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = IngestConfig::from_env().context("Invalid PICTOR_* configuration")?;
    init_tracing(config.log_format);

    let cli = Cli::parse();
    if run(cli, config).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
