// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! imgbench Core Library
//!
//! Run orchestration and measurement engine for benchmarking external
//! lossless image compression tools. Provides the run model, corpus and
//! workspace handling, the per-process resource probe, the scheduler,
//! deterministic result aggregation, and exact pixel-equality verification.

pub mod aggregate;
pub mod config;
pub mod corpus;
pub mod error;
pub mod preflight;
pub mod probe;
pub mod run;
pub mod scheduler;
pub mod types;
pub mod usage;
pub mod verify;
pub mod workspace;

// Re-export commonly used types
pub use aggregate::BatchReport;
pub use config::{Config, ConfigLoader, HarnessConfig};
pub use corpus::{Corpus, DirCorpus, MemoryCorpus};
pub use error::{BenchError, BenchResult, FatalError, HardValidationError, RunError, VerifyError};
pub use probe::ResourceProbe;
pub use run::{CommandSpec, RunMeasurement, RunResult, RunSpec};
pub use scheduler::{ExecutionMode, FailurePolicy, Scheduler};
pub use types::{Concurrency, CorpusKey, ToolName};
pub use verify::Comparison;
pub use workspace::Workspace;
