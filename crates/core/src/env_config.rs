//! Environment variable parsing with warn-level logging for invalid values.

use crate::constants::{
    DEFAULT_LOOKUP_LIMIT, DEFAULT_SEARCH_VAR, DEFAULT_SHARD_GLOB, ENV_LOOKUP_LIMIT,
    ENV_MATCH_MODE, ENV_SHARD_GLOB, ENV_VAR_NAME, MAX_LOOKUP_LIMIT,
};
use crate::MatchMode;

/// Parse a raw environment value with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                warn_invalid(var, v, &default);
                default
            },
        },
        None => default,
    }
}

/// Like [`parse_with_default`] for string settings that only need validating.
fn validate_with_default(
    var: &str,
    raw: Option<String>,
    default: String,
    is_valid: impl Fn(&str) -> bool,
) -> String {
    match raw {
        Some(v) if is_valid(&v) => v,
        Some(v) => {
            warn_invalid(var, &v, &default);
            default
        },
        None => default,
    }
}

fn warn_invalid(var: &str, value: &str, default: &dyn std::fmt::Display) {
    tracing::warn!(var, value = %value, default = %default, "invalid env var value, using default");
}

/// Lookup and output settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Match mode used when the caller does not pick one
    pub match_mode: MatchMode,
    /// Default hit limit, capped at [`MAX_LOOKUP_LIMIT`]
    pub limit: usize,
    /// Global identifier written to shard files
    pub var_name: String,
    /// Glob selecting shard files inside a search directory
    pub shard_glob: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            limit: DEFAULT_LOOKUP_LIMIT,
            var_name: DEFAULT_SEARCH_VAR.to_owned(),
            shard_glob: DEFAULT_SHARD_GLOB.to_owned(),
        }
    }
}

impl LookupConfig {
    /// Read `DOXSEARCH_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let match_mode = parse_with_default(
            ENV_MATCH_MODE,
            lookup(ENV_MATCH_MODE).as_deref(),
            defaults.match_mode,
        );
        let limit = parse_with_default(
            ENV_LOOKUP_LIMIT,
            lookup(ENV_LOOKUP_LIMIT).as_deref(),
            defaults.limit,
        )
        .min(MAX_LOOKUP_LIMIT);
        let var_name =
            validate_with_default(ENV_VAR_NAME, lookup(ENV_VAR_NAME), defaults.var_name, is_js_identifier);
        let shard_glob = validate_with_default(
            ENV_SHARD_GLOB,
            lookup(ENV_SHARD_GLOB).map(|glob| glob.trim().to_owned()),
            defaults.shard_glob,
            |glob| !glob.is_empty(),
        );

        Self { match_mode, limit, var_name, shard_glob }
    }
}

/// Returns `true` if `name` can be used as a global binding in a search shard.
#[must_use]
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` and return everything it logged.
    fn logs_of<R>(f: impl FnOnce() -> R) -> (R, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber =
            tracing_subscriber::fmt().with_writer(move || writer.clone()).with_ansi(false).finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().expect("lock").clone();
        (result, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn config_from(pairs: &[(&str, &str)]) -> LookupConfig {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        LookupConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_parse_invalid_value() {
        let result: u32 = parse_with_default("X", Some("banana"), 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_parse_empty_value() {
        let result: u32 = parse_with_default("X", Some(""), 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(config_from(&[]), LookupConfig::default());
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from(&[
            (ENV_MATCH_MODE, "substring"),
            (ENV_LOOKUP_LIMIT, "7"),
            (ENV_VAR_NAME, "otherData"),
            (ENV_SHARD_GLOB, "functions_*.js"),
        ]);
        assert_eq!(config.match_mode, MatchMode::Substring);
        assert_eq!(config.limit, 7);
        assert_eq!(config.var_name, "otherData");
        assert_eq!(config.shard_glob, "functions_*.js");
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let config = config_from(&[
            (ENV_MATCH_MODE, "fuzzy"),
            (ENV_LOOKUP_LIMIT, "many"),
            (ENV_VAR_NAME, "not an identifier"),
            (ENV_SHARD_GLOB, "   "),
        ]);
        assert_eq!(config, LookupConfig::default());
    }

    #[test]
    fn test_config_warns_on_every_bad_value() {
        let (config, logs) = logs_of(|| {
            config_from(&[
                (ENV_MATCH_MODE, "fuzzy"),
                (ENV_LOOKUP_LIMIT, "many"),
                (ENV_VAR_NAME, "not an identifier"),
                (ENV_SHARD_GLOB, "   "),
            ])
        });
        assert_eq!(config, LookupConfig::default());
        for var in [ENV_MATCH_MODE, ENV_LOOKUP_LIMIT, ENV_VAR_NAME, ENV_SHARD_GLOB] {
            assert!(logs.contains(var), "no warning for {var}: {logs}");
        }
        assert!(logs.contains("value=not an identifier"), "{logs}");
        assert!(logs.contains("default=searchData"), "{logs}");
        assert!(logs.contains("default=*.js"), "{logs}");
    }

    #[test]
    fn test_unset_values_do_not_warn() {
        let (config, logs) = logs_of(|| config_from(&[]));
        assert_eq!(config, LookupConfig::default());
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_config_caps_limit() {
        let config = config_from(&[(ENV_LOOKUP_LIMIT, "999999")]);
        assert_eq!(config.limit, MAX_LOOKUP_LIMIT);
    }

    #[test]
    fn test_js_identifier() {
        assert!(is_js_identifier("searchData"));
        assert!(is_js_identifier("_data$1"));
        assert!(!is_js_identifier("1data"));
        assert!(!is_js_identifier(""));
        assert!(!is_js_identifier("search-data"));
    }
}
