use anyhow::{bail, Result};
use doxsearch_storage::read_shard;
use std::path::PathBuf;

pub(crate) fn run(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0_usize;
    for path in files {
        match read_shard(path) {
            Ok(index) => println!(
                "ok    {} ({} keys, {} entries)",
                path.display(),
                index.row_count(),
                index.entry_count()
            ),
            Err(e) => {
                failed = failed.saturating_add(1);
                println!("error {}: {e}", path.display());
            },
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files failed to load", files.len());
    }
    Ok(())
}
