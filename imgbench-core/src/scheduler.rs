// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run scheduler.
//!
//! Executes a batch of [`RunSpec`]s either one after another or concurrently.
//! Indices are assigned at submission, before anything runs, so every result
//! can be put back in canonical order by the aggregator no matter when it
//! finished.
//!
//! In concurrent mode each run is a blocking task (the probe waits on a child
//! process) that reports through an mpsc channel. The channel only closes
//! once every task has dropped its sender, which is the completion barrier.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::aggregate::BatchReport;
use crate::error::FatalError;
use crate::probe::ResourceProbe;
use crate::run::{RunResult, RunSpec};
use crate::types::Concurrency;

/// How runs are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One run at a time, in submission order.
    Sequential,
    /// Every run launched at once, subject to the concurrency bound.
    #[default]
    Concurrent,
}

/// What the collector does with a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the batch on the first observed error. No partial report.
    #[default]
    FailFast,
    /// Run everything and keep per-run errors in the results.
    CollectAll,
}

/// Dispatches runs to a [`ResourceProbe`].
pub struct Scheduler {
    probe: Arc<ResourceProbe>,
    mode: ExecutionMode,
    concurrency: Concurrency,
    policy: FailurePolicy,
}

impl Scheduler {
    /// Create a scheduler with default settings (concurrent, unbounded, fail-fast).
    pub fn new(probe: Arc<ResourceProbe>) -> Self {
        Self {
            probe,
            mode: ExecutionMode::default(),
            concurrency: Concurrency::default(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Execute the batch and return results in canonical order.
    pub async fn run(&self, specs: Vec<RunSpec>) -> Result<BatchReport, FatalError> {
        let start = Instant::now();
        let results = self.execute(specs).await?;
        Ok(BatchReport::new(results, start.elapsed()))
    }

    /// Execute the batch. Results come back in completion order.
    pub async fn execute(&self, specs: Vec<RunSpec>) -> Result<Vec<RunResult>, FatalError> {
        let expected = specs.len();

        tracing::info!(
            runs = expected,
            mode = ?self.mode,
            concurrency = %self.concurrency,
            policy = ?self.policy,
            "Starting batch"
        );

        let results = match self.mode {
            ExecutionMode::Sequential => self.run_sequential(specs).await?,
            ExecutionMode::Concurrent => self.run_concurrent(specs).await?,
        };

        check_complete(expected, &results)?;
        Ok(results)
    }

    async fn run_sequential(&self, specs: Vec<RunSpec>) -> Result<Vec<RunResult>, FatalError> {
        let probe = Arc::clone(&self.probe);
        let results = tokio::task::spawn_blocking(move || {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, spec)| probe.execute(index, spec))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| FatalError::WorkerPanicked {
            reason: e.to_string(),
        })?;

        match self.policy {
            // Every run has executed; the lowest failing index is reported.
            FailurePolicy::FailFast => results.into_iter().map(into_fatal).collect(),
            FailurePolicy::CollectAll => Ok(results),
        }
    }

    async fn run_concurrent(&self, specs: Vec<RunSpec>) -> Result<Vec<RunResult>, FatalError> {
        let total = specs.len();
        let fail_fast = self.policy == FailurePolicy::FailFast;
        let permits = Arc::new(Semaphore::new(self.concurrency.permits_for(total)));
        let aborted = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::channel::<RunResult>(total.max(1));
        let mut workers: JoinSet<Result<(), FatalError>> = JoinSet::new();

        for (index, spec) in specs.into_iter().enumerate() {
            let tx = tx.clone();
            let probe = Arc::clone(&self.probe);
            let permits = Arc::clone(&permits);
            let aborted = Arc::clone(&aborted);

            workers.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return Ok(());
                };
                if aborted.load(Ordering::Acquire) {
                    tracing::debug!(index = index, "Skipping run after batch abort");
                    return Ok(());
                }

                let result = tokio::task::spawn_blocking(move || probe.execute(index, spec))
                    .await
                    .map_err(|e| FatalError::WorkerPanicked {
                        reason: e.to_string(),
                    })?;

                // Raised while the permit is still held, so no queued run
                // can start after a failure.
                if fail_fast && result.error.is_some() {
                    aborted.store(true, Ordering::Release);
                }

                // Capacity equals the batch size, so this never waits.
                let _ = tx.send(result).await;
                Ok(())
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        let mut fatal: Option<FatalError> = None;

        while let Some(result) = rx.recv().await {
            if fatal.is_some() {
                // Abort already decided; in-flight results are discarded.
                continue;
            }
            if self.policy == FailurePolicy::CollectAll {
                results.push(result);
                continue;
            }
            match into_fatal(result) {
                Ok(result) => results.push(result),
                Err(err) => {
                    aborted.store(true, Ordering::Release);
                    tracing::error!(error = %err, "Aborting batch on first failure");
                    fatal = Some(err);
                }
            }
        }

        // Channel closed: every task has finished or skipped. Surface panics.
        while let Some(joined) = workers.join_next().await {
            let outcome = joined.map_err(|e| FatalError::WorkerPanicked {
                reason: e.to_string(),
            });
            if let Err(err) | Ok(Err(err)) = outcome {
                fatal.get_or_insert(err);
            }
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}

/// Pass successful results through; turn a failed one into the batch error.
fn into_fatal(result: RunResult) -> Result<RunResult, FatalError> {
    match result.error {
        None => Ok(result),
        Some(source) => Err(FatalError::RunFailed {
            index: result.index,
            target: result.spec.target,
            source,
        }),
    }
}

/// Verify the result set holds each index in `0..expected` exactly once.
fn check_complete(expected: usize, results: &[RunResult]) -> Result<(), FatalError> {
    let incomplete = || FatalError::IncompleteBatch {
        expected,
        received: results.len(),
    };

    if results.len() != expected {
        return Err(incomplete());
    }

    let mut seen = vec![false; expected];
    for result in results {
        match seen.get_mut(result.index) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(incomplete()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{CommandSpec, RunMeasurement};
    use crate::types::{CorpusKey, ToolName};

    fn result(index: usize) -> RunResult {
        RunResult {
            index,
            spec: RunSpec::new(
                CommandSpec::new(ToolName::new("ect").unwrap(), vec![]),
                CorpusKey::new("1.png").unwrap(),
            ),
            measurement: RunMeasurement::default(),
            error: None,
        }
    }

    #[test]
    fn test_check_complete() {
        assert!(check_complete(0, &[]).is_ok());
        assert!(check_complete(3, &[result(2), result(0), result(1)]).is_ok());
        assert!(check_complete(3, &[result(0), result(1)]).is_err());
        assert!(check_complete(2, &[result(0), result(0)]).is_err());
        assert!(check_complete(2, &[result(0), result(5)]).is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Concurrent);
        assert_eq!(FailurePolicy::default(), FailurePolicy::FailFast);
    }

    #[test]
    fn test_mode_serde_names() {
        let mode: ExecutionMode = serde_yaml::from_str("sequential").unwrap();
        assert_eq!(mode, ExecutionMode::Sequential);
        let policy: FailurePolicy = serde_yaml::from_str("collect_all").unwrap();
        assert_eq!(policy, FailurePolicy::CollectAll);
    }
}
