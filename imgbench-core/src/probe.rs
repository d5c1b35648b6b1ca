// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Resource probe: execute one run and measure it.
//!
//! Copies the target from the corpus into the workspace, runs the tool on
//! the copy with the scratch path as the final argument, and records sizes
//! plus wall, user and system time. The copy is removed on every path.

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Instant;

use crate::corpus::Corpus;
use crate::error::{ProcessFailure, RunError};
use crate::run::{RunMeasurement, RunResult, RunSpec};
use crate::usage::wait_with_usage;
use crate::verify;
use crate::workspace::{ScratchFile, Workspace};

/// Executes runs against a shared corpus and workspace.
pub struct ResourceProbe {
    corpus: Arc<dyn Corpus>,
    workspace: Workspace,
    verify_lossless: bool,
}

impl ResourceProbe {
    pub fn new(corpus: Arc<dyn Corpus>, workspace: Workspace) -> Self {
        Self {
            corpus,
            workspace,
            verify_lossless: false,
        }
    }

    /// Decode input and output after each successful run and record
    /// whether the pixels still match.
    pub fn verify_lossless(mut self, enabled: bool) -> Self {
        self.verify_lossless = enabled;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Measure a single run.
    ///
    /// On error the partial measurement is discarded; use [`execute`] to keep
    /// the fields populated before the failure.
    ///
    /// [`execute`]: ResourceProbe::execute
    pub fn run_one(&self, index: usize, spec: &RunSpec) -> Result<RunMeasurement, RunError> {
        let mut measurement = RunMeasurement::default();
        self.measure_into(index, spec, &mut measurement)?;
        Ok(measurement)
    }

    /// Measure a single run and package the outcome as a [`RunResult`].
    pub fn execute(&self, index: usize, spec: RunSpec) -> RunResult {
        tracing::debug!(
            index = index,
            tool = %spec.command.name,
            args = %spec.command.args_display(),
            target = %spec.target,
            "Starting run"
        );

        let mut measurement = RunMeasurement::default();
        let error = self.measure_into(index, &spec, &mut measurement).err();

        match &error {
            None => tracing::info!(
                index = index,
                tool = %spec.command.name,
                target = %spec.target,
                initial_bytes = measurement.initial_size_bytes,
                optimized_bytes = measurement.optimized_size_bytes,
                wall_ms = measurement.wall_time.as_millis() as u64,
                "Run finished"
            ),
            Some(e) => tracing::warn!(
                index = index,
                tool = %spec.command.name,
                target = %spec.target,
                kind = e.kind(),
                error = %e,
                "Run failed"
            ),
        }

        RunResult {
            index,
            spec,
            measurement,
            error,
        }
    }

    fn measure_into(
        &self,
        index: usize,
        spec: &RunSpec,
        measurement: &mut RunMeasurement,
    ) -> Result<(), RunError> {
        let corpus_err = |source| RunError::CorpusRead {
            key: spec.target.clone(),
            source,
        };

        measurement.initial_size_bytes = self.corpus.stat(&spec.target).map_err(corpus_err)?;
        let source = self.corpus.read(&spec.target).map_err(corpus_err)?;

        let scratch = self
            .workspace
            .write_scratch(index, &spec.target, &source)
            .map_err(|source| RunError::WorkspaceWrite {
                path: self.workspace.scratch_path(index, &spec.target),
                source,
            })?;

        let mut command = Command::new(spec.command.name.as_str());
        command
            .args(&spec.command.args)
            .arg(scratch.path())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let start = Instant::now();
        let waited = command
            .spawn()
            .map_err(ProcessFailure::Launch)
            .and_then(|child| wait_with_usage(child).map_err(ProcessFailure::Wait));
        let wall_time = start.elapsed();

        let process_err = |reason| RunError::ProcessExecution {
            tool: spec.command.name.clone(),
            reason,
            wall_time,
        };
        let (status, usage) = waited.map_err(process_err)?;
        if !status.success() {
            return Err(process_err(ProcessFailure::ExitStatus(status)));
        }

        let optimized_size = std::fs::metadata(scratch.path())
            .map(|m| m.len())
            .map_err(|source| RunError::WorkspaceWrite {
                path: scratch.path().to_path_buf(),
                source,
            })?;

        measurement.wall_time = wall_time;
        measurement.user_time = usage.user_time;
        measurement.system_time = usage.system_time;
        measurement.optimized_size_bytes = optimized_size;

        if self.verify_lossless {
            measurement.lossless = Some(self.check_lossless(spec, &source, &scratch));
        }

        Ok(())
    }

    fn check_lossless(&self, spec: &RunSpec, source: &[u8], scratch: &ScratchFile) -> bool {
        let original = verify::decode_bytes(source, Path::new(spec.target.as_str()));
        let optimized = verify::decode_file(scratch.path());

        match (original, optimized) {
            (Ok(a), Ok(b)) => {
                let comparison = verify::compare_images(&a, &b);
                if !comparison.is_identical() {
                    tracing::warn!(
                        tool = %spec.command.name,
                        target = %spec.target,
                        %comparison,
                        "Output is not pixel-identical to input"
                    );
                }
                comparison.is_identical()
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(
                    tool = %spec.command.name,
                    target = %spec.target,
                    error = %e,
                    "Lossless check could not decode image"
                );
                false
            }
        }
    }
}
