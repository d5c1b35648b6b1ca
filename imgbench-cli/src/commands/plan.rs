// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `imgbench plan` command - Show the run matrix.
//!
//! Lists every run with the index it will be submitted under, without
//! touching the workspace or launching any tool.

use std::path::Path;
use std::process::ExitCode;

use imgbench_core::ConfigLoader;

pub fn execute(config_path: &Path) -> anyhow::Result<ExitCode> {
    let config = ConfigLoader::load_file(config_path)?;
    let runs = config.plan()?;

    println!("╔═══════╦══════════════════╦══════════════════════╦══════════════════════╗");
    println!("║ Index ║ Tool             ║ Args                 ║ Image                ║");
    println!("╠═══════╬══════════════════╬══════════════════════╬══════════════════════╣");

    for (index, run) in runs.iter().enumerate() {
        println!(
            "║ {:<5} ║ {:<16} ║ {:<20} ║ {:<20} ║",
            index,
            run.command.name.as_str(),
            run.command.args_display(),
            run.target.as_str()
        );
    }

    println!("╚═══════╩══════════════════╩══════════════════════╩══════════════════════╝");
    println!();
    println!(
        "Total: {} run(s) ({} tool invocation(s) × {} image(s))",
        runs.len(),
        config.commands.len(),
        runs.len() / config.commands.len().max(1)
    );

    Ok(ExitCode::SUCCESS)
}
