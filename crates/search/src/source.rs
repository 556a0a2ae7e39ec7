//! Shard sources.
//!
//! Loading is written against [`ShardSource`] so the same merge logic serves a
//! directory on disk and in-memory fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use doxsearch_core::constants::{DEFAULT_SHARD_GLOB, MANIFEST_FILE_NAME};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Something that can list and read shard files by name.
pub trait ShardSource {
    /// Human-readable origin, used in diagnostics.
    fn describe(&self) -> String;

    /// Candidate shard file names in sorted order, manifest excluded.
    fn list(&self) -> Result<Vec<String>>;

    /// Raw bytes of one file.
    fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// Shard files in a directory, filtered by a glob on the file name.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    matcher: GlobSet,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, glob: &str) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(glob).with_context(|| format!("invalid shard glob {glob:?}"))?);
        let matcher = builder.build()?;
        Ok(Self { dir: dir.into(), matcher })
    }

    /// Matches every `*.js` file.
    pub fn with_default_glob(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(dir, DEFAULT_SHARD_GLOB)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ShardSource for DirSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list {}", self.dir.display()))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::debug!(path = %entry.path().display(), "skipping non-utf8 file name");
                continue;
            };
            if name != MANIFEST_FILE_NAME && self.matcher.is_match(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(name);
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Shard files held in memory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), contents.into());
    }
}

impl ShardSource for MemorySource {
    fn describe(&self) -> String {
        "<memory>".to_owned()
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().filter(|name| *name != MANIFEST_FILE_NAME).cloned().collect())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files.get(name).cloned().with_context(|| format!("no file named {name}"))
    }
}
