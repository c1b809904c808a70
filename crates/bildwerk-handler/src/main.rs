// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — event-triggered image stylization.
//
// Entry point. Initialises logging, loads configuration, and dispatches to
// the batch handler or the one-off pipeline.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bildwerk_core::HandlerConfig;
use bildwerk_core::error::Result;
use bildwerk_handler::{Services, handle_event};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bildwerk")]
#[command(about = "Cartoonize color photos and duotone-colorize monochrome ones")]
#[command(version)]
struct Cli {
    /// JSON configuration file (every field optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Pipeline overrides shared by both subcommands.
#[derive(clap::Args, Clone, Default)]
struct StylizeArgs {
    /// Lossy encoding quality, 1-100
    #[arg(long)]
    quality: Option<u8>,

    /// Maximum output width in pixels
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum output height in pixels
    #[arg(long)]
    max_height: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Process a storage event document and print the batch report as JSON
    Handle {
        /// Event file, or `-` for stdin
        event: PathBuf,

        /// Root directory of the object store and outbox
        #[arg(long)]
        storage_root: Option<PathBuf>,

        #[command(flatten)]
        stylize: StylizeArgs,
    },
    /// Stylize a single local image file
    Stylize {
        input: PathBuf,
        output: PathBuf,

        /// Declared content type of the input (used when sniffing fails)
        #[arg(long)]
        content_type: Option<String>,

        #[command(flatten)]
        stylize: StylizeArgs,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "bildwerk failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => HandlerConfig::load(path)?,
        None => HandlerConfig::default(),
    };

    match cli.command {
        Command::Handle {
            event,
            storage_root,
            stylize,
        } => {
            if let Some(root) = storage_root {
                config.storage_root = root;
            }
            apply_overrides(&mut config, &stylize);
            let services = Services::init(config)?;

            let event: serde_json::Value = serde_json::from_str(&read_event(&event)?)?;
            let report = handle_event(&services, &event);
            println!("{}", serde_json::to_string_pretty(&report)?);

            Ok(if report.failed() > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Stylize {
            input,
            output,
            content_type,
            stylize,
        } => {
            apply_overrides(&mut config, &stylize);
            config.validate()?;

            let data = std::fs::read(&input)?;
            let result =
                bildwerk_imaging::stylize(&data, content_type.as_deref(), &config.stylize)?;
            std::fs::write(&output, &result.bytes)?;

            println!(
                "{} {}x{} {} -> {}",
                result.transformation,
                result.width,
                result.height,
                result.content_type,
                output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_overrides(config: &mut HandlerConfig, args: &StylizeArgs) {
    if let Some(quality) = args.quality {
        config.stylize.quality = quality;
    }
    if let Some(max_width) = args.max_width {
        config.stylize.max_width = max_width;
    }
    if let Some(max_height) = args.max_height {
        config.stylize.max_height = max_height;
    }
}

fn read_event(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
