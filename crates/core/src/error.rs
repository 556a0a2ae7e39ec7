use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur while building or configuring a symbol index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Duplicate entry: {display_name} -> {anchor_url}")]
    DuplicateEntry { display_name: String, anchor_url: String },

    #[error("Invalid symbol kind: {0}")]
    InvalidSymbolKind(String),

    #[error("Invalid match mode: {0}")]
    InvalidMatchMode(String),
}

pub type Result<T> = StdResult<T, CoreError>;
