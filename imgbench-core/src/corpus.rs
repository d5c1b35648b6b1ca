// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Read-only input corpus.
//!
//! The scheduler only needs two capabilities from a corpus: the size of a
//! file and its full contents. Anything providing those can be injected.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::types::CorpusKey;

/// By-name, read-only source of input images.
pub trait Corpus: Send + Sync {
    /// Size in bytes of the file named by `key`.
    fn stat(&self, key: &CorpusKey) -> io::Result<u64>;

    /// Full contents of the file named by `key`.
    fn read(&self, key: &CorpusKey) -> io::Result<Vec<u8>>;
}

/// Corpus backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirCorpus {
    root: PathBuf,
}

impl DirCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of `key` inside the corpus.
    pub fn path_of(&self, key: &CorpusKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// List top-level files with the given extension, sorted by name.
    pub fn list(&self, extension: &str) -> io::Result<Vec<CorpusKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "Skipping non UTF-8 corpus file");
                continue;
            };
            match CorpusKey::new(name) {
                Ok(key) => keys.push(key),
                Err(e) => tracing::warn!(error = %e, "Skipping corpus file"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl Corpus for DirCorpus {
    fn stat(&self, key: &CorpusKey) -> io::Result<u64> {
        let metadata = fs::metadata(self.path_of(key))?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", key),
            ));
        }
        Ok(metadata.len())
    }

    fn read(&self, key: &CorpusKey) -> io::Result<Vec<u8>> {
        fs::read(self.path_of(key))
    }
}

/// Corpus held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    files: HashMap<CorpusKey, Vec<u8>>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous contents under the same key.
    pub fn insert(&mut self, key: CorpusKey, contents: impl Into<Vec<u8>>) {
        self.files.insert(key, contents.into());
    }

    pub fn with_file(mut self, key: CorpusKey, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(key, contents);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Corpus for MemoryCorpus {
    fn stat(&self, key: &CorpusKey) -> io::Result<u64> {
        self.files
            .get(key)
            .map(|data| data.len() as u64)
            .ok_or_else(|| not_found(key))
    }

    fn read(&self, key: &CorpusKey) -> io::Result<Vec<u8>> {
        self.files.get(key).cloned().ok_or_else(|| not_found(key))
    }
}

fn not_found(key: &CorpusKey) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not in corpus", key))
}
