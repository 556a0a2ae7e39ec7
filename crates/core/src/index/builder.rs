//! Incremental construction of a [`SymbolIndex`].

use std::collections::{BTreeMap, HashSet};

use crate::error::{CoreError, Result};
use crate::key::SymbolKey;
use crate::symbol::{SymbolEntry, SymbolLink};

use super::{IndexRow, SymbolIndex};

/// Builder for constructing [`SymbolIndex`] instances.
///
/// Rows come out in ascending key order; entries inside a row and links inside
/// an entry keep the order they were pushed in.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    rows: BTreeMap<SymbolKey, Vec<SymbolEntry>>,
    seen: HashSet<(String, String)>,
}

impl IndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry under the key derived from its display name.
    ///
    /// Fails if any `(display_name, anchor_url)` pair was already added; the
    /// builder is left unchanged in that case.
    pub fn push(&mut self, entry: SymbolEntry) -> Result<()> {
        let key = entry.key();
        self.push_keyed(key, entry)
    }

    /// Add an entry under an explicit key, as read from a persisted shard.
    pub fn push_keyed(&mut self, key: SymbolKey, entry: SymbolEntry) -> Result<()> {
        {
            let mut pending: HashSet<&str> = HashSet::new();
            for link in &entry.links {
                let pair = (entry.display_name.clone(), link.anchor_url.clone());
                if self.seen.contains(&pair) || !pending.insert(link.anchor_url.as_str()) {
                    return Err(CoreError::DuplicateEntry {
                        display_name: entry.display_name.clone(),
                        anchor_url: link.anchor_url.clone(),
                    });
                }
            }
        }
        self.insert(key, entry);
        Ok(())
    }

    /// Add an entry, dropping links whose `(display_name, anchor_url)` pair is
    /// already present. Returns the number of dropped links.
    pub fn push_lenient(&mut self, key: SymbolKey, entry: SymbolEntry) -> usize {
        let SymbolEntry { display_name, links } = entry;
        let total = links.len();
        let mut fresh: Vec<SymbolLink> = Vec::with_capacity(total);
        for link in links {
            let pair = (display_name.clone(), link.anchor_url.clone());
            if self.seen.contains(&pair) || fresh.iter().any(|l| l.anchor_url == link.anchor_url) {
                tracing::warn!(
                    display_name = %display_name,
                    anchor_url = %link.anchor_url,
                    "dropping duplicate symbol link"
                );
                continue;
            }
            fresh.push(link);
        }
        let dropped = total.saturating_sub(fresh.len());
        if total > 0 && fresh.is_empty() {
            return dropped;
        }
        self.insert(key, SymbolEntry { display_name, links: fresh });
        dropped
    }

    fn insert(&mut self, key: SymbolKey, entry: SymbolEntry) {
        for link in &entry.links {
            self.seen.insert((entry.display_name.clone(), link.anchor_url.clone()));
        }
        let row = self.rows.entry(key).or_default();
        match row.iter_mut().find(|existing| existing.display_name == entry.display_name) {
            Some(existing) => existing.links.extend(entry.links),
            None => row.push(entry),
        }
    }

    /// Number of distinct keys added so far.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn finish(self) -> SymbolIndex {
        let rows = self
            .rows
            .into_iter()
            .map(|(key, entries)| IndexRow { key, entries })
            .collect();
        SymbolIndex { rows }
    }
}
