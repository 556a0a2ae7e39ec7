//! The `searchdata.js` manifest listing which sections and shards exist.
//!
//! ```text
//! var indexSectionsWithContent =
//! {
//!   0: "abg",
//!   1: "g"
//! };
//! ```
//!
//! followed by `indexSectionNames` and `indexSectionLabels` in the same form.
//! A section's id is its position; a shard number is the position of the key
//! initial inside the section's character list.

use std::str::FromStr;

use doxsearch_core::SymbolKind;

use crate::error::{Result, StorageError};
use crate::escape::quote_js;
use crate::literal::{parse_program, Binding, Value};

const SECTIONS_VAR: &str = "indexSectionsWithContent";
const NAMES_VAR: &str = "indexSectionNames";
const LABELS_VAR: &str = "indexSectionLabels";

/// One search section and the key initials it has shards for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SymbolKind,
    /// Leading key characters in shard order
    pub initials: Vec<char>,
}

impl Section {
    /// Shard number for `initial`, if the section has a shard for it.
    #[must_use]
    pub fn shard_number(&self, initial: char) -> Option<usize> {
        self.initials.iter().position(|c| *c == initial)
    }

    /// File name of the shard holding keys starting with `initial`.
    #[must_use]
    pub fn shard_file_name(&self, initial: char) -> Option<String> {
        self.shard_number(initial).map(|n| format!("{}_{n}.js", self.kind.as_str()))
    }
}

/// Ordered list of sections in a search directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionManifest {
    sections: Vec<Section>,
}

impl SectionManifest {
    /// Sections are ordered by kind; duplicate kinds keep the first occurrence.
    #[must_use]
    pub fn new(mut sections: Vec<Section>) -> Self {
        sections.sort_by_key(|s| s.kind);
        sections.dedup_by_key(|s| s.kind);
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, kind: SymbolKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Numeric id the search box uses for `kind`.
    #[must_use]
    pub fn section_id(&self, kind: SymbolKind) -> Option<usize> {
        self.sections.iter().position(|s| s.kind == kind)
    }

    /// Every shard file name the manifest implies.
    #[must_use]
    pub fn shard_file_names(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| {
                (0..s.initials.len()).map(move |n| format!("{}_{n}.js", s.kind.as_str()))
            })
            .collect()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let blocks = [
            render_block(SECTIONS_VAR, self.sections.iter().map(|s| s.initials.iter().collect())),
            render_block(NAMES_VAR, self.sections.iter().map(|s| s.kind.as_str().to_owned())),
            render_block(LABELS_VAR, self.sections.iter().map(|s| s.kind.label().to_owned())),
        ];
        blocks.join("\n")
    }

    /// Parse a manifest produced by [`SectionManifest::render`] or a generator
    /// using the same layout. Labels are not needed to rebuild the manifest
    /// and are only checked for presence.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let source = std::str::from_utf8(bytes)?;
        let bindings = parse_program(source)?;
        let contents = read_block(&bindings, SECTIONS_VAR)?;
        let names = read_block(&bindings, NAMES_VAR)?;
        if !bindings.iter().any(|b| b.name == LABELS_VAR) {
            tracing::debug!("manifest has no {LABELS_VAR} block");
        }
        if contents.len() != names.len() {
            return Err(StorageError::Shape(format!(
                "{SECTIONS_VAR} has {} sections but {NAMES_VAR} has {}",
                contents.len(),
                names.len()
            )));
        }

        let mut sections = Vec::with_capacity(names.len());
        for ((content_id, initials), (name_id, name)) in contents.into_iter().zip(names) {
            if content_id != name_id {
                return Err(StorageError::Shape(format!(
                    "section ids disagree: {content_id} vs {name_id}"
                )));
            }
            let kind = SymbolKind::from_str(&name)?;
            sections.push(Section { kind, initials: initials.chars().collect() });
        }
        Ok(Self { sections })
    }
}

fn render_block<I>(var: &str, values: I) -> String
where
    I: Iterator<Item = String>,
{
    let lines: Vec<String> = values
        .enumerate()
        .map(|(id, value)| format!("  {id}: {}", quote_js(&value, '"')))
        .collect();
    let mut out = format!("var {var} =\n{{\n");
    if !lines.is_empty() {
        out.push_str(&lines.join(",\n"));
        out.push('\n');
    }
    out.push_str("};\n");
    out
}

fn read_block(bindings: &[Binding], var: &str) -> Result<Vec<(usize, String)>> {
    let binding = bindings
        .iter()
        .find(|b| b.name == var)
        .ok_or_else(|| StorageError::MissingVariable(var.to_owned()))?;
    let Value::Object(props) = &binding.value else {
        return Err(StorageError::Shape(format!(
            "{var} is {}, expected object",
            binding.value.kind()
        )));
    };
    let mut entries = Vec::with_capacity(props.len());
    for (key, value) in props {
        let id = key
            .parse::<usize>()
            .map_err(|_| StorageError::Shape(format!("{var} has non-numeric key {key:?}")))?;
        let text = value.as_str().ok_or_else(|| {
            StorageError::Shape(format!("{var}[{id}] is {}, expected string", value.kind()))
        })?;
        entries.push((id, text.to_owned()));
    }
    entries.sort_by_key(|(id, _)| *id);
    Ok(entries)
}
