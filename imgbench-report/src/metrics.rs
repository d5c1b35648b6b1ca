// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serializable report model.
//!
//! Mirrors a [`BatchReport`] in a flat form suitable for JSON output and
//! later analysis, together with the machine the batch ran on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use imgbench_core::{BatchReport, RunResult};

/// System information captured at report time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of logical CPUs
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// One run, flattened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Submission index
    pub index: usize,
    pub tool: String,
    pub args: Vec<String>,
    pub image: String,
    pub initial_size_bytes: u64,
    pub optimized_size_bytes: u64,
    /// Percentage of the input saved (absent for an empty input)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_percent: Option<f64>,
    pub wall_time_ns: u64,
    pub user_time_ns: u64,
    pub system_time_ns: u64,
    /// Pixel-equality verdict, when the check ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lossless: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RunResult> for RunRecord {
    fn from(result: &RunResult) -> Self {
        let m = &result.measurement;
        Self {
            index: result.index,
            tool: result.spec.command.name.to_string(),
            args: result.spec.command.args.clone(),
            image: result.spec.target.to_string(),
            initial_size_bytes: m.initial_size_bytes,
            optimized_size_bytes: m.optimized_size_bytes,
            saved_percent: result.error.is_none().then(|| m.saved_percent()).flatten(),
            wall_time_ns: m.wall_time.as_nanos() as u64,
            user_time_ns: m.user_time.as_nanos() as u64,
            system_time_ns: m.system_time.as_nanos() as u64,
            lossless: m.lossless,
            error_kind: result.error.as_ref().map(|e| e.kind().to_string()),
            error: result.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Complete report for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Suite identifier
    pub suite: String,
    /// Harness version
    pub version: String,
    /// When the report was produced
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    /// Wall time of the whole batch in nanoseconds
    pub elapsed_ns: u64,
    /// Runs in canonical order
    pub results: Vec<RunRecord>,
}

impl RunReport {
    /// Snapshot a batch together with the current system information.
    pub fn from_batch(batch: &BatchReport) -> Self {
        Self {
            suite: "imgbench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            elapsed_ns: batch.elapsed().as_nanos() as u64,
            results: batch.results().iter().map(RunRecord::from).collect(),
        }
    }

    /// Runs whose output was checked and found to differ from the input.
    pub fn lossy(&self) -> impl Iterator<Item = &RunRecord> {
        self.results.iter().filter(|r| r.lossless == Some(false))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use imgbench_core::error::ProcessFailure;
    use imgbench_core::{CommandSpec, CorpusKey, RunError, RunMeasurement, RunSpec, ToolName};
    use std::time::Duration;

    pub(crate) fn sample_result(index: usize, tool: &str, image: &str, out: u64) -> RunResult {
        RunResult {
            index,
            spec: RunSpec::new(
                CommandSpec::new(
                    ToolName::new(tool).unwrap(),
                    vec!["--strict".to_string(), "-1".to_string()],
                ),
                CorpusKey::new(image).unwrap(),
            ),
            measurement: RunMeasurement {
                initial_size_bytes: 10_000,
                optimized_size_bytes: out,
                wall_time: Duration::from_millis(120),
                user_time: Duration::from_millis(100),
                system_time: Duration::from_millis(15),
                lossless: None,
            },
            error: None,
        }
    }

    pub(crate) fn failed_result(index: usize, image: &str) -> RunResult {
        RunResult {
            index,
            spec: RunSpec::new(
                CommandSpec::new(ToolName::new("oxipng").unwrap(), vec![]),
                CorpusKey::new(image).unwrap(),
            ),
            measurement: RunMeasurement {
                initial_size_bytes: 10_000,
                ..Default::default()
            },
            error: Some(RunError::ProcessExecution {
                tool: ToolName::new("oxipng").unwrap(),
                reason: ProcessFailure::Launch(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not found",
                )),
                wall_time: Duration::from_millis(1),
            }),
        }
    }

    #[test]
    fn test_system_info_collect() {
        let info = SystemInfo::collect();
        assert!(!info.os.is_empty());
        assert!(info.cpu_cores > 0);
        assert!(info.memory_bytes > 0);
    }

    #[test]
    fn test_record_from_result() {
        let record = RunRecord::from(&sample_result(4, "ect", "1.png", 6_000));
        assert_eq!(record.index, 4);
        assert_eq!(record.tool, "ect");
        assert_eq!(record.args, vec!["--strict", "-1"]);
        assert_eq!(record.optimized_size_bytes, 6_000);
        assert!((record.saved_percent.unwrap() - 40.0).abs() < 1e-9);
        assert_eq!(record.wall_time_ns, 120_000_000);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_record_from_failed_result() {
        let record = RunRecord::from(&failed_result(1, "2.png"));
        assert_eq!(record.error_kind.as_deref(), Some("process_execution"));
        assert!(record.error.unwrap().contains("oxipng"));
        assert!(record.saved_percent.is_none());
    }

    #[test]
    fn test_report_serialization() {
        let batch = BatchReport::new(
            vec![
                sample_result(1, "oxipng", "b.png", 9_000),
                sample_result(0, "ect", "a.png", 6_000),
            ],
            Duration::from_secs(2),
        );
        let report = RunReport::from_batch(&batch);

        assert_eq!(report.results[0].image, "a.png");
        assert_eq!(report.elapsed_ns, 2_000_000_000);

        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"suite\": \"imgbench\""));
        assert!(json.contains("system_info"));
        assert!(!json.contains("lossless"));
        assert_eq!(report.lossy().count(), 0);
    }
}
