//! Storage layer for doxsearch
//!
//! Reads and writes the persisted form of a symbol index: a JavaScript data
//! literal bound to one global (`var searchData=[...]`), split into one shard
//! per section and leading key character, plus the `searchdata.js` manifest.

mod codec;
mod error;
mod escape;
pub mod literal;
mod manifest;
mod shard;

pub use codec::{deserialize, deserialize_named, render, serialize};
pub use error::{Result, StorageError};
pub use manifest::{Section, SectionManifest};
pub use shard::{
    parse_shard_file_name, read_manifest, read_shard, ShardFile, ShardWriter,
};
