// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for imgbench.
//!
//! Every failure in the library is an explicit enum variant. Only the CLI
//! binary erases them into `anyhow::Error`.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::types::{CorpusKey, ToolName};

/// Top-level error type for the harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Tools not installed or not in PATH: {}", missing.join(", "))]
    ToolNotFound { missing: Vec<String> },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors prevent the harness from starting.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate tool invocation: {tool} {args}")]
    DuplicateCommand { tool: String, args: String },

    #[error("Duplicate image: {image}")]
    DuplicateImage { image: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Why an external tool invocation failed.
#[derive(Debug, Error)]
pub enum ProcessFailure {
    #[error("could not launch: {0}")]
    Launch(#[source] std::io::Error),

    #[error("could not wait for child: {0}")]
    Wait(#[source] std::io::Error),

    #[error("exited with {0}")]
    ExitStatus(ExitStatus),
}

/// Per-run failure. Attached to the run's result; never retried.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Cannot read corpus file {key}: {source}")]
    CorpusRead {
        key: CorpusKey,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write workspace file {}: {source}", path.display())]
    WorkspaceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tool {tool} failed after {wall_time:?}: {reason}")]
    ProcessExecution {
        tool: ToolName,
        #[source]
        reason: ProcessFailure,
        /// Wall time measured up to the failure point.
        wall_time: Duration,
    },
}

impl RunError {
    /// Short machine-friendly name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CorpusRead { .. } => "corpus_read",
            Self::WorkspaceWrite { .. } => "workspace_write",
            Self::ProcessExecution { .. } => "process_execution",
        }
    }
}

/// Batch-level failure: the scheduler could not hand over a complete report.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("run {index} ({target}) failed: {source}")]
    RunFailed {
        index: usize,
        target: CorpusKey,
        #[source]
        source: RunError,
    },

    #[error("expected {expected} results, received {received}")]
    IncompleteBatch { expected: usize, received: usize },

    #[error("worker task panicked: {reason}")]
    WorkerPanicked { reason: String },

    #[error("workspace {} unusable: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pixel verification input errors. A mismatch is never an error.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Failed to open image {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::MissingRequiredField {
            field: "tools",
            context: "root configuration".to_string(),
        };
        assert!(err.to_string().contains("tools"));
        assert!(err.to_string().contains("root configuration"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::DuplicateImage {
            image: "1.png".to_string(),
        };
        let bench_err: BenchError = validation_err.into();
        assert!(matches!(bench_err, BenchError::HardValidation(_)));
    }

    #[test]
    fn test_run_error_kind_and_display() {
        let err = RunError::CorpusRead {
            key: CorpusKey::new("missing.png").unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), "corpus_read");
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_tool_not_found_lists_all() {
        let err = BenchError::ToolNotFound {
            missing: vec!["ect".to_string(), "oxipng".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Tools not installed or not in PATH: ect, oxipng"
        );
    }
}
