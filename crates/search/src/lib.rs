//! Consumer side of a generated search directory
//!
//! Implements what the search box does before matching:
//! 1. list the shard files of a directory (or any other [`ShardSource`])
//! 2. decode each one, skipping and reporting shards that fail
//! 3. merge shards per section and answer queries over the merged tables

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

mod shard_set;
mod source;

pub use shard_set::{SearchHit, SearchQuery, ShardSet, SkippedShard};
pub use source::{DirSource, MemorySource, ShardSource};
