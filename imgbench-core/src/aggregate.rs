// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result aggregation with deterministic ordering.
//!
//! Results arrive in completion order. The canonical order groups them by
//! target file (lexicographic) and keeps submission order within a file, so
//! the tools for one image are listed in the order they were configured.

use std::cmp::Ordering;
use std::time::Duration;

use crate::run::RunResult;
use crate::types::CorpusKey;

/// Canonical comparison: target key, then submission index.
pub fn canonical_order(a: &RunResult, b: &RunResult) -> Ordering {
    a.spec
        .target
        .cmp(&b.spec.target)
        .then_with(|| a.index.cmp(&b.index))
}

/// Sort results into canonical order. Idempotent.
pub fn sort_results(results: &mut [RunResult]) {
    results.sort_by(canonical_order);
}

/// Whether every adjacent pair is in canonical order.
pub fn is_canonical(results: &[RunResult]) -> bool {
    results
        .windows(2)
        .all(|pair| canonical_order(&pair[0], &pair[1]) != Ordering::Greater)
}

/// Split canonically ordered results into one slice per target.
pub fn group_by_target(results: &[RunResult]) -> Vec<(&CorpusKey, &[RunResult])> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=results.len() {
        if i == results.len() || results[i].spec.target != results[start].spec.target {
            groups.push((&results[start].spec.target, &results[start..i]));
            start = i;
        }
    }
    groups
}

/// Ordered, complete set of results for one invocation.
#[derive(Debug)]
pub struct BatchReport {
    results: Vec<RunResult>,
    elapsed: Duration,
}

impl BatchReport {
    /// Build a report from results in any order.
    pub fn new(mut results: Vec<RunResult>, elapsed: Duration) -> Self {
        sort_results(&mut results);
        Self { results, elapsed }
    }

    /// Results in canonical order.
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    /// Wall time of the whole batch.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of runs that carry an error.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }

    pub fn by_target(&self) -> Vec<(&CorpusKey, &[RunResult])> {
        group_by_target(&self.results)
    }
}
