//! Symbol records stored in the index.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::key::SymbolKey;

/// One place a symbol is documented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolLink {
    /// Page URL plus anchor, relative to the search directory
    pub anchor_url: String,
    /// Enclosing namespace/class, or the full signature for overloads
    pub scope_label: String,
    /// `false` for links into an external tag file, which open in a new window
    #[serde(default = "default_opens_in_parent")]
    pub opens_in_parent: bool,
}

const fn default_opens_in_parent() -> bool {
    true
}

impl SymbolLink {
    #[must_use]
    pub fn new(anchor_url: impl Into<String>, scope_label: impl Into<String>) -> Self {
        Self {
            anchor_url: anchor_url.into(),
            scope_label: scope_label.into(),
            opens_in_parent: true,
        }
    }

    /// A link into an external tag file.
    #[must_use]
    pub fn external(anchor_url: impl Into<String>, scope_label: impl Into<String>) -> Self {
        Self { opens_in_parent: false, ..Self::new(anchor_url, scope_label) }
    }
}

/// One documented symbol and every definition sharing its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub display_name: String,
    pub links: Vec<SymbolLink>,
}

impl SymbolEntry {
    #[must_use]
    pub fn new(display_name: impl Into<String>, links: Vec<SymbolLink>) -> Self {
        Self { display_name: display_name.into(), links }
    }

    /// Key this entry is filed under when built from scratch.
    #[must_use]
    pub fn key(&self) -> SymbolKey {
        SymbolKey::from_display_name(&self.display_name)
    }
}

/// Search section a symbol is listed under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SymbolKind {
    /// Every symbol regardless of kind
    All,
    /// Classes, structs, unions and interfaces
    Classes,
    Namespaces,
    Files,
    /// Free functions and member functions
    Functions,
    Variables,
    Typedefs,
    Enums,
    /// Enumerators
    EnumValues,
    /// Related functions and friends
    Related,
    /// Preprocessor macros
    Defines,
    /// Doxygen groups (modules)
    Groups,
    Pages,
}

impl SymbolKind {
    /// Section order used when numbering sections in the manifest.
    pub const ALL_VARIANTS: &'static [SymbolKind] = &[
        SymbolKind::All,
        SymbolKind::Classes,
        SymbolKind::Namespaces,
        SymbolKind::Files,
        SymbolKind::Functions,
        SymbolKind::Variables,
        SymbolKind::Typedefs,
        SymbolKind::Enums,
        SymbolKind::EnumValues,
        SymbolKind::Related,
        SymbolKind::Defines,
        SymbolKind::Groups,
        SymbolKind::Pages,
    ];

    /// File-name stem of the section's shards (`functions` in `functions_6.js`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::All => "all",
            Self::Classes => "classes",
            Self::Namespaces => "namespaces",
            Self::Files => "files",
            Self::Functions => "functions",
            Self::Variables => "variables",
            Self::Typedefs => "typedefs",
            Self::Enums => "enums",
            Self::EnumValues => "enumvalues",
            Self::Related => "related",
            Self::Defines => "defines",
            Self::Groups => "groups",
            Self::Pages => "pages",
        }
    }

    /// Label shown on the section's tab in the search box.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match *self {
            Self::All => "All",
            Self::Classes => "Classes",
            Self::Namespaces => "Namespaces",
            Self::Files => "Files",
            Self::Functions => "Functions",
            Self::Variables => "Variables",
            Self::Typedefs => "Typedefs",
            Self::Enums => "Enumerations",
            Self::EnumValues => "Enumerator",
            Self::Related => "Friends",
            Self::Defines => "Macros",
            Self::Groups => "Modules",
            Self::Pages => "Pages",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "class" | "classes" | "struct" | "union" | "interface" => Ok(Self::Classes),
            "namespace" | "namespaces" => Ok(Self::Namespaces),
            "file" | "files" => Ok(Self::Files),
            "function" | "functions" => Ok(Self::Functions),
            "variable" | "variables" => Ok(Self::Variables),
            "typedef" | "typedefs" => Ok(Self::Typedefs),
            "enum" | "enums" => Ok(Self::Enums),
            "enumvalue" | "enumvalues" | "enumerator" => Ok(Self::EnumValues),
            "related" | "friend" => Ok(Self::Related),
            "define" | "defines" | "macro" => Ok(Self::Defines),
            "group" | "groups" | "module" => Ok(Self::Groups),
            "page" | "pages" => Ok(Self::Pages),
            other => Err(CoreError::InvalidSymbolKind(other.to_owned())),
        }
    }
}
