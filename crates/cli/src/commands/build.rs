use anyhow::{bail, Context, Result};
use doxsearch_core::{is_js_identifier, LookupConfig, SymbolEntry, SymbolIndex, SymbolKind, SymbolLink};
use doxsearch_storage::ShardWriter;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One symbol of the input table.
#[derive(Debug, Deserialize)]
struct SymbolRecord {
    name: String,
    #[serde(default)]
    kind: Option<String>,
    links: Vec<LinkRecord>,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    url: String,
    scope: String,
    #[serde(default = "default_opens_in_parent")]
    opens_in_parent: bool,
}

const fn default_opens_in_parent() -> bool {
    true
}

pub(crate) fn run(input: &Path, out_dir: &Path, var: Option<String>) -> Result<()> {
    let var_name = var.unwrap_or_else(|| LookupConfig::from_env().var_name);
    if !is_js_identifier(&var_name) {
        bail!("{var_name:?} is not a valid JavaScript identifier");
    }

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let records: Vec<SymbolRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid symbol table", input.display()))?;
    let sections = build_sections(records)?;

    let manifest = ShardWriter::new(var_name).write_dir(out_dir, &sections)?;
    let shards = manifest.shard_file_names().len();
    println!(
        "Wrote {shards} shards in {} sections to {}",
        manifest.sections().len(),
        out_dir.display()
    );
    Ok(())
}

/// Group records by kind; every record also lands in the `all` section.
fn build_sections(records: Vec<SymbolRecord>) -> Result<Vec<(SymbolKind, SymbolIndex)>> {
    let mut all = Vec::with_capacity(records.len());
    let mut by_kind: BTreeMap<SymbolKind, Vec<SymbolEntry>> = BTreeMap::new();
    for record in records {
        let kind = match record.kind.as_deref() {
            Some(kind) => kind
                .parse::<SymbolKind>()
                .with_context(|| format!("symbol {:?} has an unknown kind", record.name))?,
            None => SymbolKind::All,
        };
        let links = record
            .links
            .into_iter()
            .map(|l| SymbolLink { anchor_url: l.url, scope_label: l.scope, opens_in_parent: l.opens_in_parent })
            .collect();
        let entry = SymbolEntry::new(record.name, links);
        if kind != SymbolKind::All {
            by_kind.entry(kind).or_default().push(entry.clone());
        }
        all.push(entry);
    }

    let mut sections = Vec::with_capacity(by_kind.len().saturating_add(1));
    sections.push((SymbolKind::All, SymbolIndex::build(all).context("building section all")?));
    for (kind, entries) in by_kind {
        let index = SymbolIndex::build(entries).with_context(|| format!("building section {kind}"))?;
        sections.push((kind, index));
    }
    tracing::debug!(sections = sections.len(), "symbol table indexed");
    Ok(sections)
}
