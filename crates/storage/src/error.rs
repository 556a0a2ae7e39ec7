//! Typed error enum for the shard reader and writer.
//!
//! Lets the multi-shard loader tell a malformed file apart from an I/O failure
//! and report both without aborting the whole search directory.

use std::io;
use std::path::PathBuf;
use std::result::Result as StdResult;

use doxsearch_core::CoreError;
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The literal could not be tokenized or parsed.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax { line: usize, column: usize, message: String },

    /// The literal parsed but does not have the expected nesting.
    #[error("unexpected shape: {0}")]
    Shape(String),

    /// No binding with the expected global name.
    #[error("variable not found: {0}")]
    MissingVariable(String),

    /// File content is not UTF-8.
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Entries violate an index invariant (duplicate pair).
    #[error("index error: {0}")]
    Index(#[from] CoreError),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Whether the bytes themselves are bad, as opposed to the file being unreadable.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = StdResult<T, StorageError>;
