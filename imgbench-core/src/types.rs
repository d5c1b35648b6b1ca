// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Upper bound for an explicit worker pool size.
const MAX_CONCURRENCY: usize = 4096;

/// Validated compression tool name.
/// Must be non-empty and free of whitespace. May be a bare command name
/// resolved through `PATH` or a path to an executable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    /// Create a new ToolName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "tool_name",
                value: name,
                reason: "Tool name cannot be empty".to_string(),
            });
        }

        if name.chars().any(char::is_whitespace) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "tool_name",
                value: name,
                reason: "Tool name must not contain whitespace; put flags in args".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name refers to a path rather than a `PATH` lookup.
    pub fn is_path(&self) -> bool {
        self.0.contains(std::path::MAIN_SEPARATOR) || self.0.contains('/')
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ToolName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

/// Validated identifier of a file inside the read-only input corpus.
///
/// Keys are relative paths without `..` components, so a corpus can never be
/// used to address files outside its root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorpusKey(String);

impl CorpusKey {
    /// Create a new CorpusKey with validation.
    pub fn new(key: impl Into<String>) -> Result<Self, HardValidationError> {
        let key = key.into();

        if key.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "image",
                value: key,
                reason: "Image name cannot be empty".to_string(),
            });
        }

        let path = Path::new(&key);
        if path.is_absolute() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "image",
                value: key.clone(),
                reason: "Image name must be relative to the corpus directory".to_string(),
            });
        }

        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "image",
                value: key.clone(),
                reason: "Image name must not escape the corpus directory".to_string(),
            });
        }

        Ok(Self(key))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension of the key, if any (e.g. `png`).
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.0).extension().and_then(|e| e.to_str())
    }
}

impl fmt::Display for CorpusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CorpusKey {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CorpusKey> for String {
    fn from(key: CorpusKey) -> Self {
        key.0
    }
}

/// Maximum number of runs executing at the same time.
///
/// `Unbounded` submits every run at once. Each run holds a thread of the
/// tokio blocking pool while its tool executes, so the pool size (512 by
/// default) is the real ceiling on simultaneous tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Concurrency {
    #[default]
    Unbounded,
    Limited(usize),
}

impl Concurrency {
    /// Create from a raw worker count; `0` means unbounded.
    pub fn new(workers: usize) -> Result<Self, HardValidationError> {
        match workers {
            0 => Ok(Self::Unbounded),
            n if n > MAX_CONCURRENCY => Err(HardValidationError::InvalidFieldValue {
                field: "max_concurrency",
                value: n.to_string(),
                reason: format!("Must be between 0 and {}", MAX_CONCURRENCY),
            }),
            n => Ok(Self::Limited(n)),
        }
    }

    /// Effective number of permits for a batch of `runs` runs.
    pub fn permits_for(&self, runs: usize) -> usize {
        match self {
            Self::Unbounded => runs.max(1),
            Self::Limited(n) => (*n).min(runs.max(1)),
        }
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Limited(n) => write!(f, "{}", n),
        }
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = HardValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Concurrency> for usize {
    fn from(c: Concurrency) -> Self {
        match c {
            Concurrency::Unbounded => 0,
            Concurrency::Limited(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_validation() {
        assert!(ToolName::new("oxipng").is_ok());
        assert!(ToolName::new("/usr/local/bin/ect").is_ok());
        assert!(ToolName::new("").is_err());
        assert!(ToolName::new("ect --strict").is_err());
    }

    #[test]
    fn test_tool_name_is_path() {
        assert!(!ToolName::new("ect").unwrap().is_path());
        assert!(ToolName::new("./bin/ect").unwrap().is_path());
    }

    #[test]
    fn test_corpus_key_validation() {
        assert!(CorpusKey::new("1.png").is_ok());
        assert!(CorpusKey::new("photos/kodim01.png").is_ok());
        assert!(CorpusKey::new("").is_err());
        assert!(CorpusKey::new("/etc/passwd").is_err());
        assert!(CorpusKey::new("../secret.png").is_err());
        assert!(CorpusKey::new("a/../../b.png").is_err());
    }

    #[test]
    fn test_corpus_key_extension() {
        assert_eq!(CorpusKey::new("1.png").unwrap().extension(), Some("png"));
        assert_eq!(CorpusKey::new("noext").unwrap().extension(), None);
    }

    #[test]
    fn test_concurrency() {
        assert_eq!(Concurrency::new(0).unwrap(), Concurrency::Unbounded);
        assert_eq!(Concurrency::new(4).unwrap(), Concurrency::Limited(4));
        assert!(Concurrency::new(MAX_CONCURRENCY + 1).is_err());

        assert_eq!(Concurrency::Unbounded.permits_for(12), 12);
        assert_eq!(Concurrency::Limited(4).permits_for(12), 4);
        assert_eq!(Concurrency::Limited(4).permits_for(2), 2);
        assert_eq!(Concurrency::Unbounded.permits_for(0), 1);
    }

    #[test]
    fn test_serde_roundtrip_rejects_invalid() {
        let key: Result<CorpusKey, _> = serde_yaml::from_str("\"../x.png\"");
        assert!(key.is_err());
        let tool: ToolName = serde_yaml::from_str("oxipng").unwrap();
        assert_eq!(tool.as_str(), "oxipng");
    }
}
