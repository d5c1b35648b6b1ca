// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Tool availability checks performed before a batch starts.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, BenchResult};
use crate::run::CommandSpec;
use crate::types::ToolName;

/// Locate a tool: a path is checked directly, a bare name is searched in `PATH`.
pub fn resolve_tool(tool: &ToolName) -> Option<PathBuf> {
    resolve_in(tool, env::var_os("PATH").as_deref())
}

fn resolve_in(tool: &ToolName, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if tool.is_path() {
        let path = PathBuf::from(tool.as_str());
        return is_executable(&path).then_some(path);
    }

    env::split_paths(search_path?)
        .map(|dir| dir.join(tool.as_str()))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Distinct tool names from `commands` that cannot be resolved, sorted.
pub fn missing_tools(commands: &[CommandSpec]) -> Vec<String> {
    let distinct: BTreeSet<&ToolName> = commands.iter().map(|c| &c.name).collect();
    distinct
        .into_iter()
        .filter(|tool| resolve_tool(tool).is_none())
        .map(|tool| tool.to_string())
        .collect()
}

/// Fail with [`BenchError::ToolNotFound`] unless every tool resolves.
pub fn ensure_tools_installed(commands: &[CommandSpec]) -> BenchResult<()> {
    let missing = missing_tools(commands);
    if missing.is_empty() {
        return Ok(());
    }
    Err(BenchError::ToolNotFound { missing })
}
