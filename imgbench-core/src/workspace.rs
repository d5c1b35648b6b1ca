// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Scratch directory for per-run working copies.
//!
//! Every run writes to `<root>/<index>.<ext>`, so concurrent runs never
//! touch the same path. A [`ScratchFile`] removes its file when dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::CorpusKey;

/// Extension used when the corpus key has none.
const DEFAULT_EXTENSION: &str = "png";

/// Harness-owned scratch directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create the workspace, removing any stale contents first.
    pub fn prepare(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;

        tracing::debug!(workspace = %root.display(), "Prepared workspace");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scratch path reserved for run `index` working on `target`.
    pub fn scratch_path(&self, index: usize, target: &CorpusKey) -> PathBuf {
        let extension = target.extension().unwrap_or(DEFAULT_EXTENSION);
        self.root.join(format!("{}.{}", index, extension))
    }

    /// Write `contents` to the scratch path of run `index`.
    ///
    /// The returned guard deletes the file when dropped. If the write fails
    /// the partially written file is removed before returning.
    pub fn write_scratch(
        &self,
        index: usize,
        target: &CorpusKey,
        contents: &[u8],
    ) -> io::Result<ScratchFile> {
        let path = self.scratch_path(index, target);
        let guard = ScratchFile { path };
        fs::write(&guard.path, contents)?;
        Ok(guard)
    }

    /// Files currently present in the workspace, sorted.
    pub fn leftover_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            files.push(entry?.path());
        }
        files.sort();
        Ok(files)
    }

    /// Whether the workspace holds no files.
    pub fn is_clean(&self) -> io::Result<bool> {
        Ok(self.leftover_files()?.is_empty())
    }
}

/// A run's working copy, removed on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scratch file"
            ),
        }
    }
}
