//! Shard files: one per section and leading key character.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use doxsearch_core::constants::MANIFEST_FILE_NAME;
use doxsearch_core::{SymbolIndex, SymbolKind};
use regex::Regex;

use crate::codec::{deserialize, render};
use crate::error::{Result, StorageError};
use crate::manifest::{Section, SectionManifest};

static SHARD_NAME: OnceLock<Option<Regex>> = OnceLock::new();

/// A rendered shard ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardFile {
    pub file_name: String,
    pub kind: SymbolKind,
    pub initial: char,
    pub contents: String,
}

/// Splits per-section indexes into shard files plus a manifest.
#[derive(Debug, Clone)]
pub struct ShardWriter {
    var_name: String,
}

impl ShardWriter {
    #[must_use]
    pub fn new(var_name: impl Into<String>) -> Self {
        Self { var_name: var_name.into() }
    }

    /// Render every shard in memory.
    ///
    /// Empty sections are left out of the manifest. When the same kind is
    /// given twice only the first index is used.
    #[must_use]
    pub fn plan(&self, sections: &[(SymbolKind, SymbolIndex)]) -> (SectionManifest, Vec<ShardFile>) {
        let mut ordered: Vec<&(SymbolKind, SymbolIndex)> =
            sections.iter().filter(|(_, index)| !index.is_empty()).collect();
        ordered.sort_by_key(|(kind, _)| *kind);
        ordered.dedup_by_key(|(kind, _)| *kind);

        let mut manifest_sections = Vec::with_capacity(ordered.len());
        let mut files = Vec::new();
        for (kind, index) in ordered {
            let parts = index.split_by_initial();
            for (n, (initial, part)) in parts.iter().enumerate() {
                files.push(ShardFile {
                    file_name: format!("{}_{n}.js", kind.as_str()),
                    kind: *kind,
                    initial: *initial,
                    contents: render(part, &self.var_name),
                });
            }
            manifest_sections.push(Section {
                kind: *kind,
                initials: parts.iter().map(|(c, _)| *c).collect(),
            });
        }
        (SectionManifest::new(manifest_sections), files)
    }

    /// Write shards and `searchdata.js` into `dir`, creating it if needed.
    pub fn write_dir(
        &self,
        dir: &Path,
        sections: &[(SymbolKind, SymbolIndex)],
    ) -> Result<SectionManifest> {
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        let (manifest, files) = self.plan(sections);
        for file in &files {
            let path = dir.join(&file.file_name);
            fs::write(&path, &file.contents).map_err(|e| StorageError::io(&path, e))?;
            tracing::debug!(path = %path.display(), "wrote shard");
        }
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        fs::write(&manifest_path, manifest.render())
            .map_err(|e| StorageError::io(&manifest_path, e))?;
        tracing::info!(
            dir = %dir.display(),
            shards = files.len(),
            sections = manifest.sections().len(),
            "search index written"
        );
        Ok(manifest)
    }
}

/// Split a shard file name such as `functions_6.js` into section and number.
#[must_use]
pub fn parse_shard_file_name(file_name: &str) -> Option<(SymbolKind, usize)> {
    let re = SHARD_NAME
        .get_or_init(|| Regex::new(r"^([a-z]+)_(\d+)\.js$").ok())
        .as_ref()?;
    let caps = re.captures(file_name)?;
    let kind = SymbolKind::from_str(caps.get(1)?.as_str()).ok()?;
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some((kind, number))
}

/// Read and decode one shard file.
pub fn read_shard(path: &Path) -> Result<SymbolIndex> {
    let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    deserialize(&bytes)
}

/// Read the manifest of a search directory.
pub fn read_manifest(dir: &Path) -> Result<SectionManifest> {
    let path = dir.join(MANIFEST_FILE_NAME);
    let bytes = fs::read(&path).map_err(|e| StorageError::io(&path, e))?;
    SectionManifest::parse(&bytes)
}
