//! Check command implementation
//!
//! Provides the `abaplens check` command with support for:
//! - Multiple files and directories
//! - JSON output format
//! - Color control

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::frontend::config::AnalyzeConfig;
use crate::frontend::syntax::EmptyDictionary;
use crate::frontend::{analyze, Analysis, SourceInput};
use crate::util::diagnostic::{DiagnosticRenderer, EmitterConfig, JsonEmitter, Severity};

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions<'a> {
    /// Output in JSON format
    pub json: bool,
    /// Color control: "auto", "always", or "never"
    pub color: &'a str,
    /// File extensions to collect
    pub extensions: &'a [String],
}

/// Summary of a check run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Check multiple paths (files or directories) and print diagnostics
pub fn check_paths_with_options(
    paths: &[PathBuf],
    options: CheckOptions<'_>,
    config: &AnalyzeConfig,
) -> Result<CheckReport> {
    let files = collect_source_files(paths, options.extensions)?;

    if files.is_empty() {
        eprintln!("No ABAP source files found in the specified paths");
        return Ok(CheckReport::default());
    }

    let inputs = read_inputs(&files)?;
    let analysis = analyze(inputs, config, &EmptyDictionary);
    let report = summarize(&analysis);

    if options.json {
        output_json(&analysis)?;
    } else {
        output_text(&analysis, options.color);
        if !report.has_errors() {
            println!(
                "✓ All checks passed ({} file{})",
                report.files,
                if report.files == 1 { "" } else { "s" }
            );
        }
    }

    Ok(report)
}

/// Read every collected file
fn read_inputs(files: &[PathBuf]) -> Result<Vec<SourceInput>> {
    files
        .iter()
        .map(|file| SourceInput::from_path(file).context("Failed to read source"))
        .collect()
}

fn summarize(analysis: &Analysis) -> CheckReport {
    let mut report = CheckReport {
        files: analysis.files.len(),
        ..Default::default()
    };
    for diagnostic in analysis.diagnostics() {
        match diagnostic.severity {
            Severity::Error => report.errors += 1,
            Severity::Warning => report.warnings += 1,
            _ => {}
        }
    }
    report
}

/// Output diagnostics in JSON format
fn output_json(analysis: &Analysis) -> Result<()> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct FileResult<'a> {
        file: &'a str,
        diagnostics: Vec<crate::util::diagnostic::emitter::json::LspDiagnostic>,
    }

    let level = analysis.config.diagnostic_level;
    let results: Vec<FileResult<'_>> = analysis
        .files
        .iter()
        .map(|file| FileResult {
            file: file.filename(),
            diagnostics: file
                .diagnostics()
                .filter(|d| level.admits(d))
                .map(JsonEmitter::to_lsp_diagnostic)
                .collect(),
        })
        .filter(|r| !r.diagnostics.is_empty())
        .collect();

    let json = serde_json::to_string_pretty(&results).context("Failed to serialize diagnostics")?;
    println!("{}", json);
    Ok(())
}

/// Output diagnostics in text format
fn output_text(
    analysis: &Analysis,
    color: &str,
) {
    let use_colors = match color {
        "always" => true,
        "never" => false,
        _ => std::io::stderr().is_terminal(),
    };
    let renderer = DiagnosticRenderer::with_config(EmitterConfig {
        use_colors,
        ..Default::default()
    });

    let level = analysis.config.diagnostic_level;
    for file in &analysis.files {
        let diagnostics: Vec<_> = file.diagnostics().filter(|d| level.admits(d)).collect();
        if diagnostics.is_empty() {
            continue;
        }
        eprintln!();
        eprint!("{}", renderer.render_all(diagnostics, Some(&file.parsed.source)));
    }
}

/// Collect all ABAP source files from the given paths
pub fn collect_source_files(
    paths: &[PathBuf],
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let matches = |path: &Path| {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        extensions
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
    };

    for path in paths {
        if !path.exists() {
            return Err(anyhow::anyhow!("Path does not exist: {}", path.display()));
        }

        if path.is_file() {
            if matches(path) {
                files.push(path.clone());
            } else {
                tracing::warn!("Skipping non-ABAP file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in {}", path.display())
                })?;

                if entry.file_type().is_file() && matches(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    Ok(files)
}
