//! Search key normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Normalized search key derived from a symbol's display name.
///
/// Keys are not unique per symbol: overloads and names that differ only in
/// case share one key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolKey(String);

impl SymbolKey {
    /// Derives the key for a display name via [`normalize`].
    #[must_use]
    pub fn from_display_name(display_name: &str) -> Self {
        Self(normalize(display_name))
    }

    /// Wraps a key exactly as it was read from a persisted shard.
    #[must_use]
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading character, used to pick the shard a key belongs to.
    #[must_use]
    pub fn first_char(&self) -> Option<char> {
        self.0.chars().next()
    }

    #[must_use]
    pub fn is_normalized(&self) -> bool {
        normalize(&self.0) == self.0
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SymbolKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a display name (or a query) into search-key form.
///
/// Whitespace is dropped and the rest lowercased. Any character outside
/// `[a-z0-9_]` is then written as `_` plus two lowercase hex digits per UTF-8
/// byte, so `operator==` becomes `operator_3d_3d`. The output only contains
/// `[a-z0-9_]`, which makes the function idempotent.
#[must_use]
pub fn normalize(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for ch in name.chars().filter(|c| !c.is_whitespace()) {
        for lower in ch.to_lowercase() {
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() || lower == '_' {
                key.push(lower);
            } else {
                let mut buf = [0_u8; 4];
                for byte in lower.encode_utf8(&mut buf).bytes() {
                    push_escaped(&mut key, byte);
                }
            }
        }
    }
    key
}

fn push_escaped(key: &mut String, byte: u8) {
    key.push('_');
    key.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
    key.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
}
