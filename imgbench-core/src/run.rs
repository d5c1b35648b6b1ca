// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run model: what to execute and what was measured.
//!
//! A [`RunSpec`] is immutable once planned. Each spec yields exactly one
//! [`RunResult`], keyed by the index it was given at submission time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::types::{CorpusKey, ToolName};

/// A compression tool together with its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: ToolName,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(name: ToolName, args: Vec<String>) -> Self {
        Self { name, args }
    }

    /// Arguments joined with single spaces, as shown in reports.
    pub fn args_display(&self) -> String {
        self.args.join(" ")
    }
}

/// One unit of work: a tool invocation against one corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunSpec {
    pub command: CommandSpec,
    pub target: CorpusKey,
}

impl RunSpec {
    pub fn new(command: CommandSpec, target: CorpusKey) -> Self {
        Self { command, target }
    }
}

/// Build the run matrix: every image crossed with every command.
///
/// Images form the outer loop so all tools for one image are adjacent in
/// submission order.
pub fn plan_runs(images: &[CorpusKey], commands: &[CommandSpec]) -> Vec<RunSpec> {
    let mut runs = Vec::with_capacity(images.len() * commands.len());
    for image in images {
        for command in commands {
            runs.push(RunSpec::new(command.clone(), image.clone()));
        }
    }
    runs
}

/// Measurements collected while executing one run.
///
/// Fields stay at their zero value unless the step producing them completed:
/// `initial_size_bytes` once the corpus stat succeeded, the rest only when
/// the tool exited successfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeasurement {
    pub initial_size_bytes: u64,
    pub optimized_size_bytes: u64,
    pub wall_time: Duration,
    pub user_time: Duration,
    pub system_time: Duration,
    /// Pixel-equality verdict of output vs. input, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lossless: Option<bool>,
}

impl RunMeasurement {
    /// Bytes saved by the tool; negative when the output grew.
    pub fn saved_bytes(&self) -> i64 {
        self.initial_size_bytes as i64 - self.optimized_size_bytes as i64
    }

    /// Percentage of the input size saved, `None` for an empty input.
    pub fn saved_percent(&self) -> Option<f64> {
        if self.initial_size_bytes == 0 {
            return None;
        }
        Some(self.saved_bytes() as f64 / self.initial_size_bytes as f64 * 100.0)
    }
}

/// Outcome of one run.
#[derive(Debug)]
pub struct RunResult {
    pub index: usize,
    pub spec: RunSpec,
    pub measurement: RunMeasurement,
    pub error: Option<RunError>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str, args: &[&str]) -> CommandSpec {
        CommandSpec::new(
            ToolName::new(name).unwrap(),
            args.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[test]
    fn test_plan_runs_cross_product_order() {
        let images = vec![
            CorpusKey::new("1.png").unwrap(),
            CorpusKey::new("2.png").unwrap(),
        ];
        let commands = vec![command("ect", &["--strict", "-1"]), command("oxipng", &["-o", "0"])];

        let runs = plan_runs(&images, &commands);
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0].target.as_str(), "1.png");
        assert_eq!(runs[0].command.name.as_str(), "ect");
        assert_eq!(runs[1].target.as_str(), "1.png");
        assert_eq!(runs[1].command.name.as_str(), "oxipng");
        assert_eq!(runs[2].target.as_str(), "2.png");
        assert_eq!(runs[3].command.args, vec!["-o", "0"]);
    }

    #[test]
    fn test_plan_runs_empty() {
        assert!(plan_runs(&[], &[command("ect", &[])]).is_empty());
    }

    #[test]
    fn test_args_display() {
        assert_eq!(command("ect", &["--strict", "-1"]).args_display(), "--strict -1");
        assert_eq!(command("ect", &[]).args_display(), "");
    }

    #[test]
    fn test_saved_percent() {
        let m = RunMeasurement {
            initial_size_bytes: 10_000,
            optimized_size_bytes: 7_500,
            ..Default::default()
        };
        assert_eq!(m.saved_bytes(), 2_500);
        assert!((m.saved_percent().unwrap() - 25.0).abs() < 1e-9);

        let grew = RunMeasurement {
            initial_size_bytes: 100,
            optimized_size_bytes: 110,
            ..Default::default()
        };
        assert!(grew.saved_percent().unwrap() < 0.0);

        assert!(RunMeasurement::default().saved_percent().is_none());
    }
}
