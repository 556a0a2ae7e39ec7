//! Immutable symbol index and its lookup operations.

mod builder;

pub use builder::IndexBuilder;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::key::{normalize, SymbolKey};
use crate::symbol::SymbolEntry;

/// How a query is matched against stored keys
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Key starts with the normalized query
    #[default]
    Prefix,
    /// Key contains the normalized query anywhere
    Substring,
}

impl MatchMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Prefix => "prefix",
            Self::Substring => "substring",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "substring" | "contains" => Ok(Self::Substring),
            other => Err(CoreError::InvalidMatchMode(other.to_owned())),
        }
    }
}

/// All entries filed under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    key: SymbolKey,
    entries: Vec<SymbolEntry>,
}

impl IndexRow {
    #[must_use]
    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    #[must_use]
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }
}

/// Read-only mapping from [`SymbolKey`] to the entries filed under it.
///
/// Rows are sorted by key (byte order). Built once by [`SymbolIndex::build`],
/// [`IndexBuilder`] or [`SymbolIndex::merge`], and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolIndex {
    rows: Vec<IndexRow>,
}

impl SymbolIndex {
    /// Build an index from a symbol table.
    ///
    /// Repeated display names merge their links into one entry; different
    /// display names with the same key share a row. Fails only when a
    /// `(display_name, anchor_url)` pair occurs twice.
    pub fn build<I>(symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = SymbolEntry>,
    {
        let mut builder = IndexBuilder::new();
        for entry in symbols {
            builder.push(entry)?;
        }
        Ok(builder.finish())
    }

    /// Combine several indexes (e.g. loaded shards) into one.
    ///
    /// Duplicate `(display_name, anchor_url)` pairs are dropped with a warning
    /// instead of failing. Returns the merged index and the number of dropped links.
    #[must_use]
    pub fn merge<I>(indexes: I) -> (Self, usize)
    where
        I: IntoIterator<Item = SymbolIndex>,
    {
        let mut builder = IndexBuilder::new();
        let mut dropped = 0_usize;
        for index in indexes {
            for row in index.rows {
                for entry in row.entries {
                    dropped = dropped.saturating_add(builder.push_lenient(row.key.clone(), entry));
                }
            }
        }
        (builder.finish(), dropped)
    }

    /// Entries whose key starts with `normalize(query)`.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Vec<&SymbolEntry> {
        self.lookup_with(query, MatchMode::Prefix)
    }

    /// Entries matching `query` under `mode`, in key order then insertion order.
    #[must_use]
    pub fn lookup_with(&self, query: &str, mode: MatchMode) -> Vec<&SymbolEntry> {
        self.lookup_rows(query, mode).into_iter().flat_map(|row| row.entries.iter()).collect()
    }

    /// Rows matching `query` under `mode`, in key order.
    #[must_use]
    pub fn lookup_rows(&self, query: &str, mode: MatchMode) -> Vec<&IndexRow> {
        let needle = normalize(query);
        match mode {
            MatchMode::Prefix => {
                let start = self.rows.partition_point(|row| row.key.as_str() < needle.as_str());
                self.rows[start..]
                    .iter()
                    .take_while(|row| row.key.as_str().starts_with(needle.as_str()))
                    .collect()
            },
            MatchMode::Substring => {
                self.rows.iter().filter(|row| row.key.as_str().contains(needle.as_str())).collect()
            },
        }
    }

    /// Exact key lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&IndexRow> {
        self.rows
            .binary_search_by(|row| row.key.as_str().cmp(key))
            .ok()
            .and_then(|pos| self.rows.get(pos))
    }

    #[must_use]
    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    pub fn keys(&self) -> impl Iterator<Item = &SymbolKey> {
        self.rows.iter().map(|row| &row.key)
    }

    /// Every entry in index order.
    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.rows.iter().flat_map(|row| row.entries.iter())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.rows.iter().map(|row| row.entries.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into one index per leading key character, ordered by that character.
    ///
    /// Rows with an empty key are filed under `'_'`.
    #[must_use]
    pub fn split_by_initial(&self) -> Vec<(char, SymbolIndex)> {
        let mut parts: Vec<(char, SymbolIndex)> = Vec::new();
        for row in &self.rows {
            let initial = row.key.first_char().unwrap_or('_');
            match parts.iter_mut().find(|(c, _)| *c == initial) {
                Some((_, part)) => part.rows.push(row.clone()),
                None => parts.push((initial, SymbolIndex { rows: vec![row.clone()] })),
            }
        }
        parts.sort_by_key(|(c, _)| *c);
        parts
    }
}
