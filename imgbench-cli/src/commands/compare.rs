// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `imgbench compare` command - Check two images for pixel equality.

use std::path::Path;
use std::process::ExitCode;

use imgbench_core::verify::compare_files;

pub fn execute(left: &Path, right: &Path) -> anyhow::Result<ExitCode> {
    tracing::debug!(left = %left.display(), right = %right.display(), "Comparing images");

    let comparison = compare_files(left, right)?;
    if comparison.is_identical() {
        println!("The images are the same.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", comparison);
    println!("The images are different.");
    Ok(ExitCode::FAILURE)
}
