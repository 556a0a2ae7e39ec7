//! Conversion between a [`SymbolIndex`] and its persisted shard text.
//!
//! A shard binds one global to an array of rows:
//!
//! ```text
//! var searchData=
//! [
//!   ['getlife',['GetLife',['../struct_unit.html#a10e2',1,'SC2API::Unit']]],
//!   ['key',['Name',link,link],['OtherName',link]]
//! ];
//! ```
//!
//! A link is `[url, 1|0, scope]`. Display names and scopes are HTML-escaped.

use doxsearch_core::constants::DEFAULT_SEARCH_VAR;
use doxsearch_core::{
    normalize, IndexBuilder, IndexRow, SymbolEntry, SymbolIndex, SymbolKey, SymbolLink,
};

use crate::error::{Result, StorageError};
use crate::escape::{escape_html, quote_js, unescape_html};
use crate::literal::{parse_program, Value};

/// Serialize `index` bound to the default `searchData` global.
#[must_use]
pub fn serialize(index: &SymbolIndex) -> Vec<u8> {
    render(index, DEFAULT_SEARCH_VAR).into_bytes()
}

/// Render `index` as shard text bound to `var_name`.
#[must_use]
pub fn render(index: &SymbolIndex, var_name: &str) -> String {
    let mut out = format!("var {var_name}=\n[\n");
    let rows: Vec<String> = index.rows().iter().map(|row| format!("  {}", render_row(row))).collect();
    if !rows.is_empty() {
        out.push_str(&rows.join(",\n"));
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

fn render_row(row: &IndexRow) -> String {
    let mut out = String::from("[");
    out.push_str(&quote_js(row.key().as_str(), '\''));
    for entry in row.entries() {
        out.push_str(",[");
        out.push_str(&quote_js(&escape_html(&entry.display_name), '\''));
        for link in &entry.links {
            out.push_str(",[");
            out.push_str(&quote_js(&link.anchor_url, '\''));
            out.push_str(if link.opens_in_parent { ",1," } else { ",0," });
            out.push_str(&quote_js(&escape_html(&link.scope_label), '\''));
            out.push(']');
        }
        out.push(']');
    }
    out.push(']');
    out
}

/// Deserialize shard bytes.
///
/// Reads the `searchData` binding, or the only binding when the file defines
/// exactly one under another name.
pub fn deserialize(bytes: &[u8]) -> Result<SymbolIndex> {
    let source = std::str::from_utf8(bytes)?;
    let mut bindings = parse_program(source)?;
    let position = bindings
        .iter()
        .position(|b| b.name == DEFAULT_SEARCH_VAR)
        .or(if bindings.len() == 1 { Some(0) } else { None })
        .ok_or_else(|| StorageError::MissingVariable(DEFAULT_SEARCH_VAR.to_owned()))?;
    decode_rows(&bindings.swap_remove(position).value)
}

/// Deserialize shard bytes, requiring the table to be bound to `var_name`.
pub fn deserialize_named(bytes: &[u8], var_name: &str) -> Result<SymbolIndex> {
    let source = std::str::from_utf8(bytes)?;
    let binding = parse_program(source)?
        .into_iter()
        .find(|b| b.name == var_name)
        .ok_or_else(|| StorageError::MissingVariable(var_name.to_owned()))?;
    decode_rows(&binding.value)
}

fn decode_rows(value: &Value) -> Result<SymbolIndex> {
    let rows = value
        .as_array()
        .ok_or_else(|| StorageError::Shape(format!("table is {}, expected array", value.kind())))?;

    let mut builder = IndexBuilder::new();
    let mut previous: Option<SymbolKey> = None;
    let mut out_of_order = 0_usize;
    for (i, row) in rows.iter().enumerate() {
        let (key, entries) = decode_row(row).map_err(|e| match e {
            StorageError::Shape(msg) => StorageError::Shape(format!("row {i}: {msg}")),
            other => other,
        })?;
        if previous.as_ref().is_some_and(|prev| key < *prev) {
            out_of_order = out_of_order.saturating_add(1);
        }
        for entry in entries {
            if normalize(&entry.display_name) != key.as_str() {
                tracing::debug!(
                    key = %key,
                    display_name = %entry.display_name,
                    "stored key differs from normalized display name"
                );
            }
            builder.push_keyed(key.clone(), entry)?;
        }
        previous = Some(key);
    }
    if out_of_order > 0 {
        tracing::warn!(out_of_order, "shard rows not in key order, re-sorted");
    }
    Ok(builder.finish())
}

fn decode_row(row: &Value) -> Result<(SymbolKey, Vec<SymbolEntry>)> {
    let items = expect_array(row, "row")?;
    let (key, groups) = items
        .split_first()
        .ok_or_else(|| StorageError::Shape("empty row".to_owned()))?;
    let key = expect_str(key, "key")?;
    if groups.is_empty() {
        return Err(StorageError::Shape(format!("row '{key}' has no entries")));
    }
    let entries = groups.iter().map(decode_entry).collect::<Result<Vec<_>>>()?;
    Ok((SymbolKey::from_stored(key), entries))
}

fn decode_entry(group: &Value) -> Result<SymbolEntry> {
    let items = expect_array(group, "entry")?;
    let (name, rest) = items
        .split_first()
        .ok_or_else(|| StorageError::Shape("empty entry".to_owned()))?;
    let display_name = unescape_html(expect_str(name, "display name")?);

    // `[name, [[url, scope], ...]]` nests the link list one level deeper.
    let links = match rest {
        [Value::Array(inner)] if inner.iter().all(|v| matches!(v, Value::Array(_))) => {
            inner.as_slice()
        },
        _ => rest,
    };
    let links = links.iter().map(decode_link).collect::<Result<Vec<_>>>()?;
    Ok(SymbolEntry::new(display_name, links))
}

fn decode_link(link: &Value) -> Result<SymbolLink> {
    match expect_array(link, "link")? {
        [url, Value::Int(flag), scope] => Ok(SymbolLink {
            anchor_url: expect_str(url, "anchor url")?.to_owned(),
            scope_label: unescape_html(expect_str(scope, "scope label")?),
            opens_in_parent: *flag != 0,
        }),
        [url, scope] => Ok(SymbolLink::new(
            expect_str(url, "anchor url")?,
            unescape_html(expect_str(scope, "scope label")?),
        )),
        other => Err(StorageError::Shape(format!("link has {} elements", other.len()))),
    }
}

fn expect_array<'v>(value: &'v Value, what: &str) -> Result<&'v [Value]> {
    value
        .as_array()
        .ok_or_else(|| StorageError::Shape(format!("{what} is {}, expected array", value.kind())))
}

fn expect_str<'v>(value: &'v Value, what: &str) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| StorageError::Shape(format!("{what} is {}, expected string", value.kind())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn unit_entry(name: &str, anchor: &str) -> SymbolEntry {
        SymbolEntry::new(name, vec![SymbolLink::new(anchor, "SC2API::Unit")])
    }

    fn sample_index() -> SymbolIndex {
        SymbolIndex::build(vec![
            unit_entry("GetLife", "../struct_unit.html#a1"),
            unit_entry("GetEnergy", "../struct_unit.html#a2"),
            SymbolEntry::new(
                "operator<",
                vec![SymbolLink::external("ext.html#lt", "Point::operator<(const Point &p)")],
            ),
            unit_entry("getLife", "../struct_unit.html#a3"),
            unit_entry("O'Brien", "../people.html#ob"),
        ])
        .expect("build")
    }

    #[test]
    fn test_render_layout() {
        let index = SymbolIndex::build(vec![
            unit_entry("GetLife", "../struct_unit.html#a1"),
            unit_entry("GetEnergy", "../struct_unit.html#a2"),
        ])
        .expect("build");
        let expected = "var searchData=\n[\n  \
            ['getenergy',['GetEnergy',['../struct_unit.html#a2',1,'SC2API::Unit']]],\n  \
            ['getlife',['GetLife',['../struct_unit.html#a1',1,'SC2API::Unit']]]\n];\n";
        assert_eq!(render(&index, "searchData"), expected);
    }

    #[test]
    fn test_render_escapes() {
        let text = render(&sample_index(), "searchData");
        assert!(text.contains("['operator_3c',['operator&lt;',['ext.html#lt',0,'Point::operator&lt;(const Point &amp;p)']]]"), "{text}");
        assert!(text.contains("['getlife',['GetLife',"), "{text}");
        assert!(text.contains("],['getLife',"), "{text}");
        assert!(text.contains(r"['o_27brien',['O\'Brien',"), "{text}");
    }

    #[test]
    fn test_round_trip() {
        let index = sample_index();
        let bytes = serialize(&index);
        let decoded = deserialize(&bytes).expect("deserialize");
        assert_eq!(decoded, index);
        assert_eq!(serialize(&decoded), bytes);
    }

    /// Names and scopes with quotes, entities, backslashes, control and non-ASCII characters.
    fn symbol_text() -> impl Strategy<Value = String> {
        r#"[a-zA-Z0-9_ '"&<>;\\\n\r\t\x01é€😀:~()]{0,12}"#
    }

    proptest! {
        #[test]
        fn test_round_trip_any_built_index(
            symbols in prop::collection::vec((symbol_text(), symbol_text(), any::<bool>()), 0..24)
        ) {
            let entries = symbols.into_iter().enumerate().map(|(i, (name, scope, opens_in_parent))| {
                let link = SymbolLink { anchor_url: format!("page.html#a{i}"), scope_label: scope, opens_in_parent };
                SymbolEntry::new(name, vec![link])
            });
            let index = SymbolIndex::build(entries).expect("anchors are unique");
            let bytes = serialize(&index);
            let decoded = deserialize(&bytes).expect("deserialize");
            prop_assert_eq!(&decoded, &index);
            prop_assert_eq!(serialize(&decoded), bytes);
        }
    }

    #[test]
    fn test_empty_index() {
        let empty = SymbolIndex::default();
        let bytes = serialize(&empty);
        assert_eq!(String::from_utf8(bytes.clone()).expect("utf8"), "var searchData=\n[\n];\n");
        let decoded = deserialize(&bytes).expect("deserialize");
        assert!(decoded.is_empty());
        assert!(decoded.lookup("").is_empty());
    }

    #[test]
    fn test_accepts_nested_link_lists() {
        let src = "var searchData = [\n  [\"getlife\", [\"GetLife\", [[\"u.html#1\", \"SC2API::Unit\"], [\"u.html#2\", \"SC2API::Unit\"]]]],\n];";
        let index = deserialize(src.as_bytes()).expect("deserialize");
        let found = index.lookup("getlife");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].links.len(), 2);
        assert!(found[0].links.iter().all(|l| l.opens_in_parent));
    }

    #[test]
    fn test_sorts_out_of_order_rows() {
        let src = "var searchData=[['getlife',['GetLife',['b',1,'U']]],['getenergy',['GetEnergy',['a',1,'U']]]];";
        let index = deserialize(src.as_bytes()).expect("deserialize");
        let keys: Vec<&str> = index.keys().map(SymbolKey::as_str).collect();
        assert_eq!(keys, vec!["getenergy", "getlife"]);
    }

    #[test]
    fn test_named_binding() {
        let text = render(&sample_index(), "otherData");
        assert!(deserialize_named(text.as_bytes(), "otherData").is_ok());
        assert!(matches!(
            deserialize_named(text.as_bytes(), "searchData"),
            Err(StorageError::MissingVariable(_))
        ));
        // The sole binding is accepted whatever its name.
        assert_eq!(deserialize(text.as_bytes()).expect("deserialize"), sample_index());
    }

    #[test]
    fn test_malformed_inputs() {
        let cases: &[&str] = &[
            "var searchData=[['getlife',['GetLife',['u',1,'U']]]",
            "var searchData={};",
            "var searchData=[['getlife']];",
            "var searchData=[[1,['GetLife',['u',1,'U']]]];",
            "var searchData=[['getlife',['GetLife',['u',1]]]];",
            "var a=[]; var b=[];",
        ];
        for case in cases {
            let err = deserialize(case.as_bytes()).expect_err(case);
            assert!(err.is_malformed(), "{case}: {err}");
        }
        assert!(matches!(deserialize(&[0xff, 0xfe]), Err(StorageError::Utf8(_))));
    }

    #[test]
    fn test_duplicate_pair_in_file_is_rejected() {
        let src = "var searchData=[['getlife',['GetLife',['u',1,'U'],['u',1,'V']]]];";
        assert!(matches!(deserialize(src.as_bytes()), Err(StorageError::Index(_))));
    }
}
