//! Multi-shard loading and querying.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{bail, Result};
use doxsearch_core::constants::{DEFAULT_LOOKUP_LIMIT, MANIFEST_FILE_NAME, MAX_LOOKUP_LIMIT};
use doxsearch_core::{MatchMode, SymbolIndex, SymbolKind, SymbolLink};
use doxsearch_storage::{deserialize, parse_shard_file_name, SectionManifest};
use serde::Serialize;

use crate::source::{DirSource, ShardSource};

/// A shard that was found but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedShard {
    pub name: String,
    pub reason: String,
}

/// One matched symbol, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub key: String,
    pub display_name: String,
    pub links: Vec<SymbolLink>,
    pub section: SymbolKind,
}

/// Query parameters for [`ShardSet::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub section: SymbolKind,
    pub mode: MatchMode,
    /// Capped at [`MAX_LOOKUP_LIMIT`]
    pub limit: usize,
}

impl SearchQuery {
    /// Prefix query over the `all` section with the default limit.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: SymbolKind::All,
            mode: MatchMode::Prefix,
            limit: DEFAULT_LOOKUP_LIMIT,
        }
    }

    #[must_use]
    pub fn section(mut self, section: SymbolKind) -> Self {
        self.section = section;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Every shard of a search directory, merged per section.
///
/// Immutable once loaded; share it behind an `Arc` for concurrent lookups.
#[derive(Debug, Clone, Default)]
pub struct ShardSet {
    sections: BTreeMap<SymbolKind, SymbolIndex>,
    skipped: Vec<SkippedShard>,
    loaded: usize,
}

impl ShardSet {
    /// Load every shard `source` lists.
    ///
    /// A shard that cannot be read or decoded is skipped with a warning. Fails
    /// only when shards were found and none of them loaded. Without an `all`
    /// section, one is synthesized from the other sections.
    pub fn load<S: ShardSource + ?Sized>(source: &S) -> Result<Self> {
        let names = source.list()?;
        check_manifest(source, &names);

        let mut per_section: BTreeMap<SymbolKind, Vec<SymbolIndex>> = BTreeMap::new();
        let mut skipped = Vec::new();
        let mut loaded = 0_usize;
        for name in names {
            let Some((kind, number)) = parse_shard_file_name(&name) else {
                tracing::debug!(name, "ignoring file that is not a shard");
                continue;
            };
            let decoded = source
                .read(&name)
                .and_then(|bytes| deserialize(&bytes).map_err(anyhow::Error::from));
            match decoded {
                Ok(index) => {
                    tracing::debug!(
                        name,
                        section = %kind,
                        shard = number,
                        rows = index.row_count(),
                        "loaded shard"
                    );
                    per_section.entry(kind).or_default().push(index);
                    loaded = loaded.saturating_add(1);
                },
                Err(e) => {
                    tracing::warn!(name, error = %e, "skipping shard that failed to load");
                    skipped.push(SkippedShard { name, reason: format!("{e:#}") });
                },
            }
        }

        if loaded == 0 && !skipped.is_empty() {
            bail!("no shard in {} could be loaded ({} failed)", source.describe(), skipped.len());
        }

        let mut sections = BTreeMap::new();
        for (kind, parts) in per_section {
            let (index, dropped) = SymbolIndex::merge(parts);
            if dropped > 0 {
                tracing::warn!(section = %kind, dropped, "dropped duplicate links across shards");
            }
            sections.insert(kind, index);
        }
        if !sections.is_empty() && !sections.contains_key(&SymbolKind::All) {
            let (all, _) = SymbolIndex::merge(sections.values().cloned());
            sections.insert(SymbolKind::All, all);
        }

        tracing::info!(
            source = %source.describe(),
            loaded,
            skipped = skipped.len(),
            sections = sections.len(),
            "search shards loaded"
        );
        Ok(Self { sections, skipped, loaded })
    }

    /// Load the shards of `dir` whose names match `glob`.
    pub fn load_dir(dir: &Path, glob: &str) -> Result<Self> {
        Self::load(&DirSource::new(dir, glob)?)
    }

    /// Matches in key order, then insertion order, truncated to the query limit.
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
        let Some(index) = self.sections.get(&query.section) else {
            return Vec::new();
        };
        let limit = query.limit.min(MAX_LOOKUP_LIMIT);
        index
            .lookup_rows(&query.text, query.mode)
            .into_iter()
            .flat_map(|row| {
                row.entries().iter().map(move |entry| SearchHit {
                    key: row.key().to_string(),
                    display_name: entry.display_name.clone(),
                    links: entry.links.clone(),
                    section: query.section,
                })
            })
            .take(limit)
            .collect()
    }

    #[must_use]
    pub fn section(&self, kind: SymbolKind) -> Option<&SymbolIndex> {
        self.sections.get(&kind)
    }

    /// Sections with at least one loaded shard, in manifest order.
    pub fn section_kinds(&self) -> impl Iterator<Item = SymbolKind> + '_ {
        self.sections.keys().copied()
    }

    #[must_use]
    pub fn skipped(&self) -> &[SkippedShard] {
        &self.skipped
    }

    #[must_use]
    pub const fn loaded_count(&self) -> usize {
        self.loaded
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(SymbolIndex::is_empty)
    }
}

/// Warn about shards the manifest promises but the source does not have.
///
/// Only sections with at least one listed shard are checked, so a glob that
/// selects a subset of sections does not trigger warnings.
fn check_manifest<S: ShardSource + ?Sized>(source: &S, names: &[String]) {
    let Ok(bytes) = source.read(MANIFEST_FILE_NAME) else {
        tracing::debug!(source = %source.describe(), "no manifest");
        return;
    };
    match SectionManifest::parse(&bytes) {
        Ok(manifest) => {
            let present: HashSet<&str> = names.iter().map(String::as_str).collect();
            let listed: HashSet<SymbolKind> =
                names.iter().filter_map(|n| parse_shard_file_name(n)).map(|(k, _)| k).collect();
            for expected in manifest.shard_file_names() {
                let in_listed_section = parse_shard_file_name(&expected)
                    .is_some_and(|(kind, _)| listed.contains(&kind));
                if in_listed_section && !present.contains(expected.as_str()) {
                    tracing::warn!(name = %expected, "shard listed in manifest is missing");
                }
            }
        },
        Err(e) => tracing::warn!(error = %e, "ignoring malformed manifest"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use doxsearch_core::SymbolEntry;
    use doxsearch_storage::serialize;
    use pretty_assertions::assert_eq;

    fn shard(entries: &[(&str, &str)]) -> Vec<u8> {
        let index = SymbolIndex::build(entries.iter().map(|(name, anchor)| {
            SymbolEntry::new(*name, vec![SymbolLink::new(*anchor, "SC2API::Unit")])
        }))
        .expect("build");
        serialize(&index)
    }

    fn names(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.display_name.as_str()).collect()
    }

    #[test]
    fn test_loads_and_merges_sections() {
        let source = MemorySource::new()
            .with_file("all_0.js", shard(&[("Attack", "u.html#1")]))
            .with_file("all_1.js", shard(&[("GetLife", "u.html#2"), ("GetEnergy", "u.html#3")]))
            .with_file("functions_0.js", shard(&[("GetLife", "u.html#2")]));
        let set = ShardSet::load(&source).expect("load");
        assert_eq!(set.loaded_count(), 3);
        assert!(set.skipped().is_empty());
        assert_eq!(set.section_kinds().collect::<Vec<_>>(), vec![SymbolKind::All, SymbolKind::Functions]);

        let hits = set.search(&SearchQuery::new(""));
        assert_eq!(names(&hits), vec!["Attack", "GetEnergy", "GetLife"]);
        let hits = set.search(&SearchQuery::new("get").section(SymbolKind::Functions));
        assert_eq!(names(&hits), vec!["GetLife"]);
        assert_eq!(hits[0].section, SymbolKind::Functions);
        assert_eq!(hits[0].key, "getlife");
    }

    #[test]
    fn test_malformed_shard_is_skipped() {
        let source = MemorySource::new()
            .with_file("all_0.js", shard(&[("Attack", "u.html#1")]))
            .with_file("all_1.js", "var searchData=[['getlife',");
        let set = ShardSet::load(&source).expect("load");
        assert_eq!(set.loaded_count(), 1);
        assert_eq!(set.skipped().len(), 1);
        assert_eq!(set.skipped()[0].name, "all_1.js");
        assert_eq!(names(&set.search(&SearchQuery::new("a"))), vec!["Attack"]);
    }

    #[test]
    fn test_deeply_nested_shard_is_skipped() {
        let nested = format!("var searchData={}", "[".repeat(200_000));
        let source = MemorySource::new()
            .with_file("all_0.js", shard(&[("Attack", "u.html#1")]))
            .with_file("all_1.js", nested);
        let set = ShardSet::load(&source).expect("load");
        assert_eq!(set.skipped().len(), 1);
        assert_eq!(set.skipped()[0].name, "all_1.js");
        assert!(set.skipped()[0].reason.contains("nesting too deep"));
        assert_eq!(names(&set.search(&SearchQuery::new("attack"))), vec!["Attack"]);
    }

    #[test]
    fn test_all_shards_malformed_fails() {
        let source = MemorySource::new().with_file("all_0.js", "not a shard");
        assert!(ShardSet::load(&source).is_err());
    }

    #[test]
    fn test_empty_source_is_valid() {
        let set = ShardSet::load(&MemorySource::new()).expect("load");
        assert!(set.is_empty());
        assert!(set.search(&SearchQuery::new("")).is_empty());
    }

    #[test]
    fn test_non_shard_files_are_ignored() {
        let source = MemorySource::new()
            .with_file("search.js", "function init() {}")
            .with_file("all_0.js", shard(&[("Attack", "u.html#1")]));
        let set = ShardSet::load(&source).expect("load");
        assert_eq!(set.loaded_count(), 1);
        assert!(set.skipped().is_empty());
    }

    #[test]
    fn test_synthesizes_all_section() {
        let source = MemorySource::new()
            .with_file("functions_0.js", shard(&[("GetLife", "u.html#2")]))
            .with_file("classes_0.js", shard(&[("Unit", "u.html")]));
        let set = ShardSet::load(&source).expect("load");
        assert_eq!(names(&set.search(&SearchQuery::new(""))), vec!["GetLife", "Unit"]);
    }

    #[test]
    fn test_limit_and_mode() {
        let source = MemorySource::new().with_file(
            "all_0.js",
            shard(&[("GetLife", "u.html#1"), ("GetEnergy", "u.html#2"), ("GetType", "u.html#3")]),
        );
        let set = ShardSet::load(&source).expect("load");
        assert_eq!(names(&set.search(&SearchQuery::new("get").limit(2))), vec!["GetEnergy", "GetLife"]);
        assert!(set.search(&SearchQuery::new("life")).is_empty());
        assert_eq!(
            names(&set.search(&SearchQuery::new("life").mode(MatchMode::Substring))),
            vec!["GetLife"]
        );
        assert!(set.search(&SearchQuery::new("get").section(SymbolKind::Enums)).is_empty());
    }
}
