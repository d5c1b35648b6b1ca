// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! imgbench CLI
//!
//! Command-line interface for benchmarking lossless image compression tools.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::run::RunOptions;

/// imgbench - Benchmark harness for lossless image compression tools
#[derive(Parser)]
#[command(name = "imgbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "imgbench.yaml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every tool against every image and write the report
    Run {
        /// Run one tool invocation at a time
        #[arg(long)]
        sequential: bool,

        /// Maximum number of concurrent runs (0 = unbounded)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Keep going after a failed run and report it in the table
        #[arg(long)]
        collect_all: bool,

        /// Also save a JSON report into this directory
        #[arg(long)]
        json_dir: Option<PathBuf>,

        /// Check that every output is pixel-identical to its input
        #[arg(long)]
        verify: bool,
    },

    /// Compare two images pixel by pixel
    Compare {
        /// First image
        left: PathBuf,

        /// Second image
        right: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file (defaults to --config)
        file: Option<PathBuf>,
    },

    /// Print the run matrix without executing anything
    Plan,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging. Logs go to stderr so the CSV on stdout stays clean.
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            sequential,
            jobs,
            collect_all,
            json_dir,
            verify,
        } => {
            let options = RunOptions {
                sequential,
                jobs,
                collect_all,
                json_dir,
                verify,
            };
            commands::run::execute(&cli.config, options).await
        }
        Commands::Compare { left, right } => commands::compare::execute(&left, &right),
        Commands::Validate { file } => {
            commands::validate::execute(file.as_ref().unwrap_or(&cli.config))
        }
        Commands::Plan => commands::plan::execute(&cli.config),
    }
}
