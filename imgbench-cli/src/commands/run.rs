// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `imgbench run` command - Execute the benchmark matrix.
//!
//! Loads the configuration, checks that every tool is installed, runs the
//! batch and writes the CSV report (and optionally a JSON report).

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use imgbench_core::preflight::ensure_tools_installed;
use imgbench_core::{
    BenchResult, Concurrency, ConfigLoader, DirCorpus, ExecutionMode, FailurePolicy, FatalError,
    HarnessConfig, ResourceProbe, Scheduler, Workspace,
};
use imgbench_report::{CsvReporter, JsonReporter, RunReport};

/// Command-line overrides for the harness settings.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub sequential: bool,
    pub jobs: Option<usize>,
    pub collect_all: bool,
    pub json_dir: Option<PathBuf>,
    pub verify: bool,
}

impl RunOptions {
    /// Apply flags on top of the file configuration. Flags only ever switch
    /// settings on; an absent flag leaves the configured value alone.
    pub fn apply(&self, harness: &mut HarnessConfig) -> BenchResult<()> {
        if self.sequential {
            harness.mode = ExecutionMode::Sequential;
        }
        if let Some(jobs) = self.jobs {
            harness.concurrency = Concurrency::new(jobs)?;
        }
        if self.collect_all {
            harness.failure_policy = FailurePolicy::CollectAll;
        }
        if self.verify {
            harness.verify_lossless = true;
        }
        Ok(())
    }
}

pub async fn execute(config_path: &Path, options: RunOptions) -> anyhow::Result<ExitCode> {
    tracing::info!(config = %config_path.display(), "Loading configuration");

    // Load and validate configuration - fail fast on invalid config
    let mut config = ConfigLoader::load_file(config_path)?;
    options.apply(&mut config.harness)?;
    let harness = &config.harness;

    ensure_tools_installed(&config.commands)?;
    let specs = config.plan()?;

    tracing::info!(
        tools = config.commands.len(),
        runs = specs.len(),
        corpus = %harness.corpus_dir.display(),
        "Configuration validated successfully"
    );

    let workspace =
        Workspace::prepare(&harness.workspace_dir).map_err(|source| FatalError::Workspace {
            path: harness.workspace_dir.clone(),
            source,
        })?;
    let corpus = Arc::new(DirCorpus::new(&harness.corpus_dir));
    let probe = Arc::new(
        ResourceProbe::new(corpus, workspace).verify_lossless(harness.verify_lossless),
    );

    let report = Scheduler::new(probe)
        .mode(harness.mode)
        .concurrency(harness.concurrency)
        .policy(harness.failure_policy)
        .run(specs)
        .await?;

    let csv = CsvReporter::new(&harness.report_path);
    csv.save(report.results(), std::io::stdout().lock())
        .with_context(|| format!("writing {}", csv.path().display()))?;

    let run_report = RunReport::from_batch(&report);
    for lossy in run_report.lossy() {
        tracing::warn!(
            tool = %lossy.tool,
            args = %lossy.args.join(" "),
            image = %lossy.image,
            "Output differs from input"
        );
    }

    if let Some(dir) = &options.json_dir {
        let path = JsonReporter::new(dir)?.save(&run_report)?;
        tracing::info!(path = %path.display(), "JSON report saved");
    }

    let failures = report.failure_count();
    tracing::info!(
        runs = report.len(),
        failures = failures,
        elapsed_ms = report.elapsed().as_millis() as u64,
        report = %csv.path().display(),
        "Batch complete"
    );

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
