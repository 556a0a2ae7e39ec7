use anyhow::Result;
use doxsearch_core::{LookupConfig, MatchMode, SymbolKind};
use doxsearch_search::{SearchQuery, ShardSet};
use std::path::Path;

pub(crate) fn run(
    query: &str,
    dir: &Path,
    section: SymbolKind,
    mode: Option<MatchMode>,
    limit: Option<usize>,
) -> Result<()> {
    let config = LookupConfig::from_env();
    let set = ShardSet::load_dir(dir, &config.shard_glob)?;
    for skipped in set.skipped() {
        eprintln!("Skipped {}: {}", skipped.name, skipped.reason);
    }

    let query = SearchQuery::new(query)
        .section(section)
        .mode(mode.unwrap_or(config.match_mode))
        .limit(limit.unwrap_or(config.limit));
    let hits = set.search(&query);
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
