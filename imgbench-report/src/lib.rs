// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! imgbench reporting
//!
//! Renders a completed batch for people and for tools.
//!
//! # Outputs
//!
//! - **CSV**: one row per run with human-readable sizes, savings and times,
//!   printed to the terminal and saved to the configured report path.
//! - **JSON**: raw measurements plus system information, saved to
//!   timestamped files for later comparison.

pub mod format;
pub mod metrics;
pub mod reporter;

pub use format::{format_bytes, format_duration, format_saved};
pub use metrics::{RunRecord, RunReport, SystemInfo};
pub use reporter::{csv_row, CsvReporter, JsonReporter, ReporterError, CSV_HEADERS};
