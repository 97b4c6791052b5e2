//! Subcommand implementations

use crate::cli::{Cli, Command};
use anyhow::{Context, Result};
use genforge_artifact::{GeneratedFile, StageName};
use genforge_core::{GenerationRequest, PipelineConfig, StagePlan};
use genforge_validation::ValidationGate;
use std::path::{Path, PathBuf};

/// Text to print and whether the command succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(stdout: String) -> Self {
        Self {
            stdout,
            success: true,
        }
    }
}

/// Run the selected subcommand
///
/// # Errors
/// Returns error when configuration or inputs cannot be read
pub fn run(cli: &Cli) -> Result<CommandOutput> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match &cli.command {
        Command::Validate { paths } => validate(&config, paths),
        Command::Plan { request } => plan(&read_request(request)?),
        Command::CacheKey { request } => {
            let key = read_request(request)?.cache_key()?;
            Ok(CommandOutput::ok(key.to_string()))
        }
    }
}

/// Validate files on disk; unsuccessful when the verdict fails
///
/// # Errors
/// Returns error if a file cannot be read or the gate rejects the batch
pub fn validate(config: &PipelineConfig, paths: &[PathBuf]) -> Result<CommandOutput> {
    let files = load_files(paths)?;
    tracing::info!(files = files.len(), "validating");

    let report = ValidationGate::new(&config.validation).validate(&files)?;
    Ok(CommandOutput {
        stdout: serde_json::to_string_pretty(&report)?,
        success: report.passed,
    })
}

/// Resolved standard plan for a request
///
/// # Errors
/// Returns error if the plan cannot be resolved
pub fn plan(request: &GenerationRequest) -> Result<CommandOutput> {
    let stages = StagePlan::standard().resolve(request)?;
    Ok(CommandOutput::ok(serde_json::to_string_pretty(&stages)?))
}

fn read_request(path: &Path) -> Result<GenerationRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading request {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing request {}", path.display()))
}

/// Read files, descending into directories in name order
///
/// Files on disk have no producing stage; they are attributed to validation.
///
/// # Errors
/// Returns error if a path cannot be read or is not UTF-8 text
pub fn load_files(paths: &[PathBuf]) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    for path in paths {
        collect(path, &mut files)?;
    }
    Ok(files)
}

fn collect(path: &Path, files: &mut Vec<GeneratedFile>) -> Result<()> {
    if path.is_dir() {
        let mut entries = std::fs::read_dir(path)
            .with_context(|| format!("listing {}", path.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("listing {}", path.display()))?;
        entries.sort();
        for entry in entries {
            collect(&entry, files)?;
        }
        return Ok(());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    files.push(GeneratedFile::new(
        StageName::Validation,
        path.to_string_lossy(),
        content,
    ));
    Ok(())
}
