// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates the benchmark matrix at start-up time.
//! Any invalid field results in a HardValidationError that prevents the run.

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::corpus::DirCorpus;
use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::run::{plan_runs, CommandSpec, RunSpec};
use crate::scheduler::{ExecutionMode, FailurePolicy};
use crate::types::{Concurrency, CorpusKey, ToolName};

/// Extension used when discovering corpus files.
pub const CORPUS_EXTENSION: &str = "png";

/// Raw harness settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawHarnessConfig {
    #[serde(default = "default_corpus_dir")]
    corpus_dir: String,
    #[serde(default = "default_workspace_dir")]
    workspace_dir: String,
    #[serde(default)]
    mode: ExecutionMode,
    #[serde(default)]
    max_concurrency: usize,
    #[serde(default)]
    failure_policy: FailurePolicy,
    #[serde(default = "default_report_path")]
    report_path: String,
    #[serde(default)]
    verify_lossless: bool,
}

fn default_corpus_dir() -> String {
    "test_files".to_string()
}

fn default_workspace_dir() -> String {
    "work".to_string()
}

fn default_report_path() -> String {
    "report.csv".to_string()
}

impl Default for RawHarnessConfig {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            workspace_dir: default_workspace_dir(),
            mode: ExecutionMode::default(),
            max_concurrency: 0,
            failure_policy: FailurePolicy::default(),
            report_path: default_report_path(),
            verify_lossless: false,
        }
    }
}

/// Raw tool invocation.
#[derive(Debug, Deserialize)]
struct RawToolConfig {
    name: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    harness: RawHarnessConfig,
    #[serde(default)]
    tools: Vec<RawToolConfig>,
    #[serde(default)]
    images: Vec<String>,
}

/// Validated harness settings.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub corpus_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub mode: ExecutionMode,
    pub concurrency: Concurrency,
    pub failure_policy: FailurePolicy,
    pub report_path: PathBuf,
    pub verify_lossless: bool,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub harness: HarnessConfig,
    pub commands: Vec<CommandSpec>,
    /// Explicit image list. Empty means "every png in the corpus".
    pub images: Vec<CorpusKey>,
}

impl Config {
    /// Images to benchmark: the explicit list, or every corpus file with
    /// the corpus extension, sorted by name.
    pub fn resolve_images(&self) -> BenchResult<Vec<CorpusKey>> {
        if !self.images.is_empty() {
            return Ok(self.images.clone());
        }

        let corpus = DirCorpus::new(&self.harness.corpus_dir);
        let images = corpus.list(CORPUS_EXTENSION).map_err(|e| BenchError::Io {
            context: "listing corpus directory",
            source: e,
        })?;

        if images.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: format!(
                    "Corpus directory {} contains no .{} files",
                    self.harness.corpus_dir.display(),
                    CORPUS_EXTENSION
                ),
            }
            .into());
        }
        Ok(images)
    }

    /// Build the full run matrix (images × commands).
    pub fn plan(&self) -> BenchResult<Vec<RunSpec>> {
        let images = self.resolve_images()?;
        Ok(plan_runs(&images, &self.commands))
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    /// Returns HardValidationError for any invalid fields.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<Config> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> BenchResult<Config> {
        let harness = Self::validate_harness(raw.harness)?;

        if raw.tools.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "tools",
                context: "root configuration".to_string(),
            }
            .into());
        }

        let mut commands = Vec::with_capacity(raw.tools.len());
        let mut seen_commands = HashSet::new();
        for (index, raw_tool) in raw.tools.into_iter().enumerate() {
            let command = Self::validate_tool(raw_tool, index)?;

            if !seen_commands.insert(command.clone()) {
                return Err(HardValidationError::DuplicateCommand {
                    tool: command.name.to_string(),
                    args: command.args_display(),
                }
                .into());
            }
            commands.push(command);
        }

        let mut images = Vec::with_capacity(raw.images.len());
        let mut seen_images = HashSet::new();
        for raw_image in raw.images {
            let image = CorpusKey::new(raw_image)?;
            if !seen_images.insert(image.clone()) {
                return Err(HardValidationError::DuplicateImage {
                    image: image.to_string(),
                }
                .into());
            }
            images.push(image);
        }

        Ok(Config {
            harness,
            commands,
            images,
        })
    }

    /// Validate harness settings.
    fn validate_harness(raw: RawHarnessConfig) -> BenchResult<HarnessConfig> {
        for (field, value) in [
            ("corpus_dir", &raw.corpus_dir),
            ("workspace_dir", &raw.workspace_dir),
            ("report_path", &raw.report_path),
        ] {
            if value.trim().is_empty() {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: value.clone(),
                    reason: "Path cannot be empty".to_string(),
                }
                .into());
            }
        }

        Self::validate_workspace_placement(&raw.corpus_dir, &raw.workspace_dir)?;

        let concurrency = Concurrency::new(raw.max_concurrency)?;

        Ok(HarnessConfig {
            corpus_dir: PathBuf::from(raw.corpus_dir),
            workspace_dir: PathBuf::from(raw.workspace_dir),
            mode: raw.mode,
            concurrency,
            failure_policy: raw.failure_policy,
            report_path: PathBuf::from(raw.report_path),
            verify_lossless: raw.verify_lossless,
        })
    }

    /// The workspace is wiped on start, so it must not contain, equal or sit
    /// inside the corpus, and must not contain the current directory.
    fn validate_workspace_placement(corpus_dir: &str, workspace_dir: &str) -> BenchResult<()> {
        let resolve_err = |source| BenchError::Io {
            context: "resolving harness paths",
            source,
        };
        let corpus = resolve_path(Path::new(corpus_dir)).map_err(resolve_err)?;
        let workspace = resolve_path(Path::new(workspace_dir)).map_err(resolve_err)?;
        let cwd = std::env::current_dir()
            .and_then(|dir| resolve_path(&dir))
            .map_err(resolve_err)?;

        let reason = if workspace.starts_with(&corpus) || corpus.starts_with(&workspace) {
            Some(format!(
                "Workspace is wiped on start and overlaps corpus_dir ({})",
                corpus.display()
            ))
        } else if cwd.starts_with(&workspace) {
            Some("Workspace is wiped on start and contains the current directory".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(HardValidationError::InvalidFieldValue {
                field: "workspace_dir",
                value: workspace_dir.to_string(),
                reason,
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Validate a single tool entry.
    fn validate_tool(raw: RawToolConfig, index: usize) -> BenchResult<CommandSpec> {
        let name = ToolName::new(&raw.name)?;

        if raw.args.iter().any(|a| a.is_empty()) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "args",
                value: format!("tool at index {}", index),
                reason: "Arguments cannot be empty strings".to_string(),
            }
            .into());
        }

        Ok(CommandSpec::new(name, raw.args))
    }
}

/// Absolute form of `path` with `.` and `..` folded away and symlinks
/// resolved for the part of the path that already exists.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    let mut existing = normalized.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(real) = existing.canonicalize() {
            return Ok(missing.into_iter().rev().fold(real, |acc, name| acc.join(name)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(normalized),
        }
    }
}
