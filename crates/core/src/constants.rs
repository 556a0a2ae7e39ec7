//! Shared constants for doxsearch.

/// Global identifier a shard binds its table to.
pub const DEFAULT_SEARCH_VAR: &str = "searchData";

/// File the section manifest is written to inside a search directory.
pub const MANIFEST_FILE_NAME: &str = "searchdata.js";

/// Default glob used to pick shard files out of a search directory.
pub const DEFAULT_SHARD_GLOB: &str = "*.js";

/// Default number of hits returned when the caller does not pass a limit.
pub const DEFAULT_LOOKUP_LIMIT: usize = 50;

/// Maximum number of hits for any lookup.
pub const MAX_LOOKUP_LIMIT: usize = 1000;

/// Environment variable selecting the default match mode (`prefix` or `substring`).
pub const ENV_MATCH_MODE: &str = "DOXSEARCH_MATCH_MODE";

/// Environment variable overriding [`DEFAULT_LOOKUP_LIMIT`].
pub const ENV_LOOKUP_LIMIT: &str = "DOXSEARCH_LOOKUP_LIMIT";

/// Environment variable overriding [`DEFAULT_SEARCH_VAR`].
pub const ENV_VAR_NAME: &str = "DOXSEARCH_VAR_NAME";

/// Environment variable overriding [`DEFAULT_SHARD_GLOB`].
pub const ENV_SHARD_GLOB: &str = "DOXSEARCH_SHARD_GLOB";
