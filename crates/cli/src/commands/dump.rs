use anyhow::{Context, Result};
use doxsearch_core::SymbolEntry;
use doxsearch_storage::{deserialize, deserialize_named};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct DumpRow<'a> {
    key: &'a str,
    entries: &'a [SymbolEntry],
}

pub(crate) fn run(file: &Path, var: Option<&str>) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let index = match var {
        Some(name) => deserialize_named(&bytes, name)?,
        None => deserialize(&bytes)?,
    };
    let rows: Vec<DumpRow<'_>> = index
        .rows()
        .iter()
        .map(|row| DumpRow { key: row.key().as_str(), entries: row.entries() })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
