//! abaplens - CLI

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use abaplens::frontend::{DiagLevel, Version};
use abaplens::util::config::{ProjectConfig, CONFIG_FILE_NAME};
use abaplens::util::diagnostic::check::{check_paths_with_options, CheckOptions};
use abaplens::util::logger::{self, LogLevel};
use abaplens::{NAME, VERSION};

/// Parsing and resolution core for ABAP static analysis
#[derive(Parser, Debug)]
#[command(name = "abaplens")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and resolve ABAP sources, printing diagnostics
    Check {
        /// Files or directories to check
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Output diagnostics as JSON
        #[arg(long)]
        json: bool,

        /// Color output: auto, always, never
        #[arg(long, default_value = "auto")]
        color: String,

        /// Override the target language version (e.g. v702, v757)
        #[arg(long)]
        version: Option<Version>,

        /// Diagnostic level: none, errors, warnings, all
        #[arg(long)]
        level: Option<DiagLevel>,

        /// Project directory holding abaplens.json
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Analyse files sequentially
        #[arg(long)]
        no_parallel: bool,
    },

    /// Write a default abaplens.json into a directory
    Init {
        /// Target directory
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::init_with_level(LogLevel::from_verbosity(args.verbose));

    match args.command {
        Commands::Check {
            paths,
            json,
            color,
            version,
            level,
            project,
            no_parallel,
        } => {
            let project = ProjectConfig::load_from_dir(&project)
                .with_context(|| format!("Failed to load config from {}", project.display()))?;
            let mut config = project.syntax;
            if let Some(version) = version {
                config = config.with_version(version);
            }
            if let Some(level) = level {
                config = config.with_diagnostic_level(level);
            }
            if no_parallel {
                config = config.with_parallel(false);
            }

            let options = CheckOptions {
                json,
                color: &color,
                extensions: &project.files.extensions,
            };
            let report = check_paths_with_options(&paths, options, &config)?;
            if report.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Init { dir } => {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            let json = ProjectConfig::default().to_json()?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Created {}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
