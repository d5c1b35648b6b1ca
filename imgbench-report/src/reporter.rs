// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report writers.
//!
//! The CSV report is the primary output: one row per run in canonical order,
//! echoed to the terminal and saved to disk. The JSON report keeps the raw
//! numbers and machine details in timestamped files for later analysis.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use imgbench_core::RunResult;

use crate::format::{format_bytes, format_duration, format_saved};
use crate::metrics::RunReport;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Column headers of the CSV report.
pub const CSV_HEADERS: [&str; 9] = [
    "Tool", "Args", "Img", "In", "Out", "Saved", "Wall", "System", "User",
];

/// Render one result as a CSV row.
pub fn csv_row(result: &RunResult) -> [String; 9] {
    let m = &result.measurement;
    let saved = match &result.error {
        Some(err) => format!("ERROR: {}", err),
        None => format_saved(m.saved_percent()),
    };

    [
        result.spec.command.name.to_string(),
        result.spec.command.args_display(),
        result.spec.target.to_string(),
        format_bytes(m.initial_size_bytes),
        format_bytes(m.optimized_size_bytes),
        saved,
        format_duration(m.wall_time),
        format_duration(m.system_time),
        format_duration(m.user_time),
    ]
}

/// CSV reporter writing to a file and echoing to another sink.
pub struct CsvReporter {
    path: PathBuf,
}

impl CsvReporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode results as CSV.
    pub fn render(results: &[RunResult]) -> Result<Vec<u8>, ReporterError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;
        for result in results {
            writer.write_record(csv_row(result))?;
        }
        writer
            .into_inner()
            .map_err(|e| ReporterError::Io(e.into_error()))
    }

    /// Write the report to the file and to `echo` with identical content.
    pub fn save(&self, results: &[RunResult], mut echo: impl Write) -> Result<(), ReporterError> {
        let encoded = Self::render(results)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &encoded)?;

        echo.write_all(&encoded)?;
        echo.flush()?;
        Ok(())
    }
}

/// JSON reporter for batch reports.
pub struct JsonReporter {
    /// Output directory for report files
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a report to a timestamped JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &RunReport) -> Result<PathBuf, ReporterError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let mut filepath = self.output_dir.join(format!("runs_{}.json", timestamp));

        // Two batches in the same second must not overwrite each other.
        let mut suffix = 1;
        while filepath.exists() {
            filepath = self
                .output_dir
                .join(format!("runs_{}_{}.json", timestamp, suffix));
            suffix += 1;
        }

        let file = File::create(&filepath)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;

        Ok(filepath)
    }

    /// List all existing report files in the output directory.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load an existing report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<RunReport, ReporterError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}
