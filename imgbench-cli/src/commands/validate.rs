// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `imgbench validate` command - Validate configuration file.

use std::path::Path;
use std::process::ExitCode;

use imgbench_core::preflight::resolve_tool;
use imgbench_core::ConfigLoader;

pub fn execute(file: &Path) -> anyhow::Result<ExitCode> {
    tracing::info!(file = %file.display(), "Validating configuration");

    let config = match ConfigLoader::load_file(file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let harness = &config.harness;
    println!("✓ Configuration is valid");
    println!();
    println!("Harness Settings:");
    println!("  Corpus Directory:    {}", harness.corpus_dir.display());
    println!("  Workspace Directory: {}", harness.workspace_dir.display());
    println!("  Mode:                {:?}", harness.mode);
    println!("  Max Concurrency:     {}", harness.concurrency);
    println!("  Failure Policy:      {:?}", harness.failure_policy);
    println!("  Report Path:         {}", harness.report_path.display());
    println!("  Verify Lossless:     {}", harness.verify_lossless);
    println!();

    println!("Tools ({}):", config.commands.len());
    for command in &config.commands {
        let status = match resolve_tool(&command.name) {
            Some(path) => format!("found at {}", path.display()),
            None => "NOT FOUND".to_string(),
        };
        println!(
            "  - {} [{}] ({})",
            command.name,
            command.args_display(),
            status
        );
    }
    println!();

    if config.images.is_empty() {
        println!("Images: all *.png files in {}", harness.corpus_dir.display());
    } else {
        println!("Images ({}):", config.images.len());
        for image in &config.images {
            println!("  - {}", image);
        }
    }

    Ok(ExitCode::SUCCESS)
}
