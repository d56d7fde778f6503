//! File-level type definitions
//!
//! Records produced by the repository walker and consumed by the
//! documentation pipeline.

use serde::{Deserialize, Serialize};

/// Literal inserted between the head and tail of an abbreviated file
pub const TRUNCATION_MARKER: &str = "\n\n... [content truncated due to file size] ...\n\n";

/// A source file read from the repository
///
/// Created once by the walker and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    /// Text content, possibly abbreviated with [`TRUNCATION_MARKER`]
    pub content: String,
    /// Display name of the language, `"Unknown"` if unrecognised
    pub language: String,
    /// Original size in bytes, even when `content` was abbreviated
    pub size: u64,
}

impl ProcessedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        language: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language: language.into(),
            size,
        }
    }

    /// Whether the stored content is abbreviated
    pub fn is_truncated(&self) -> bool {
        self.content.contains(TRUNCATION_MARKER)
    }

    /// File name component of the path
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Parent directory of the path, `None` at the repository root
    pub fn parent_dir(&self) -> Option<&str> {
        self.path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .filter(|dir| !dir.is_empty())
    }

    /// Size rounded to whole kilobytes
    pub fn size_kb(&self) -> u64 {
        (self.size + 512) / 1024
    }
}

/// One entry in the documentation index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Display title (the directory key)
    pub title: String,
    /// Output file name relative to the index
    pub path: String,
}

impl Section {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }
}
