//! Core types for doxsearch
//!
//! This crate contains the symbol index shared by the storage codec, the
//! multi-shard consumer and the CLI: key normalization, symbol records,
//! `build` and `lookup`.

pub mod constants;
mod env_config;
mod error;
mod index;
mod key;
mod symbol;

pub use env_config::*;
pub use error::*;
pub use index::*;
pub use key::*;
pub use symbol::*;
