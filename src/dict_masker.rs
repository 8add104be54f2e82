//! Structured-value masking
//!
//! Log lines often embed dict/JSON payloads whose values explode the
//! template space (ids, prices, free text). These helpers find every
//! outermost `{...}` span in a line and rewrite it with each scalar leaf
//! replaced by `<*>`, keeping keys, key order and container shape.
//!
//! Brace counting does not understand string literals, so a `{` or `}`
//! inside a quoted value shifts the detected span.

use crate::event_template::WILDCARD;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::io;

/// Half-open byte ranges of every outermost `{...}` span, left to right.
///
/// A `}` with no open span is ignored; an unclosed trailing `{` yields
/// nothing.
pub fn find_structured_bounds(text: &str) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut start = None;
    let mut depth = 0usize;

    for pos in memchr::memchr2_iter(b'{', b'}', text.as_bytes()) {
        if text.as_bytes()[pos] == b'{' {
            if depth == 0 {
                start = Some(pos);
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(start) = start.take() {
                    bounds.push((start, pos + 1));
                }
            }
        }
    }

    bounds
}

/// Replace every scalar leaf with `<*>`, keeping mappings and sequences.
pub fn mask_structured_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), mask_structured_values(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_structured_values).collect()),
        _ => Value::String(WILDCARD.to_string()),
    }
}

/// Mask every embedded structured fragment in `text`.
///
/// Single quotes are read as double quotes so Python-style dict reprs
/// parse. Spans that still fail to parse are left untouched.
pub fn mask_structured_values_in_text(text: &str) -> String {
    let bounds = find_structured_bounds(text);
    if bounds.is_empty() {
        return text.to_string();
    }

    let mut masked = String::with_capacity(text.len());
    let mut cursor = 0;

    for (start, end) in bounds {
        masked.push_str(&text[cursor..start]);
        let fragment = &text[start..end];
        match mask_fragment(fragment) {
            Some(replacement) => masked.push_str(&replacement),
            None => {
                tracing::debug!("Leaving unparsable fragment as-is: {}", fragment);
                masked.push_str(fragment);
            }
        }
        cursor = end;
    }

    masked.push_str(&text[cursor..]);
    masked
}

// Valid JSON is taken as-is; only otherwise are single quotes swapped.
fn mask_fragment(fragment: &str) -> Option<String> {
    let value: Value = match serde_json::from_str(fragment) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(&fragment.replace('\'', "\"")).ok()?,
    };
    to_spaced_json(&mask_structured_values(&value)).ok()
}

/// Serialize with `", "` between items and `": "` after keys.
pub fn to_spaced_json(value: &Value) -> io::Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser).map_err(io::Error::from)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Dotted key paths of a parsed mapping.
///
/// `keys` holds every path (`data`, `data.id`); `log_keys` holds the paths
/// whose value is a non-mapping other than the empty string, i.e. the keys
/// that carry log content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPaths {
    pub keys: BTreeSet<String>,
    pub log_keys: BTreeSet<String>,
}

impl KeyPaths {
    pub fn from_value(value: &Value) -> Self {
        let mut paths = Self::default();
        if let Value::Object(map) = value {
            paths.collect(map, "");
        }
        paths
    }

    fn collect(&mut self, map: &Map<String, Value>, header: &str) {
        for (key, value) in map {
            let path = format!("{}{}", header, key);
            match value {
                Value::Object(nested) => {
                    self.collect(nested, &format!("{}.", path));
                }
                Value::String(s) if s.is_empty() => {}
                _ => {
                    self.log_keys.insert(path.clone());
                }
            }
            self.keys.insert(path);
        }
    }
}
