//! Key path traversal over JSON objects.
//!
//! The three traversals deliberately disagree about missing structure:
//!
//! - [`get_path`] fails with [`Error::KeyNotFound`] on any missing key or
//!   non-object intermediate.
//! - [`set_path`] creates missing intermediates as empty objects, but fails with
//!   [`Error::PathConflict`] when an intermediate holds a non-object value.
//! - [`remove_path`] quietly does nothing when the path does not resolve.

use std::io;
use std::ops::{Bound, RangeBounds};

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Value};

use crate::encoding::Encoding;
use crate::error::{json_type_name, Error, Result};
use crate::path::KeyPath;

/// A JSON document: the top-level object of a file.
pub type Document = Map<String, Value>;

/// Get a reference to the value at `key_path`.
pub fn get_path<'a>(document: &'a Document, key_path: &KeyPath) -> Result<&'a Value> {
    let (parents, last) = key_path.split_last()?;

    let mut cursor = document;
    for key in parents {
        match cursor.get(key.as_str()) {
            Some(Value::Object(map)) => cursor = map,
            _ => return Err(Error::key_not_found(key_path)),
        }
    }

    cursor
        .get(last)
        .ok_or_else(|| Error::key_not_found(key_path))
}

pub fn contains_path(document: &Document, key_path: &KeyPath) -> bool {
    get_path(document, key_path).is_ok()
}

/// Set the value at `key_path`, creating missing intermediate objects.
///
/// Returns the previous value at `key_path`, if any. On error the document is
/// left unchanged: conflicts are detected before anything is created.
pub fn set_path(document: &mut Document, key_path: &KeyPath, value: Value) -> Result<Option<Value>> {
    let (parents, last) = key_path.split_last()?;
    check_writable(document, key_path, parents)?;

    let mut cursor = document;
    for key in parents {
        let entry = cursor.entry(key.as_str()).or_insert_with(|| {
            log::trace!("Creating intermediate object {:?} for {}", key, key_path);
            Value::Object(Map::new())
        });
        cursor = match entry {
            Value::Object(map) => map,
            // check_writable has already ruled this out.
            other => {
                return Err(Error::PathConflict {
                    key_path: key_path.clone(),
                    found: json_type_name(other),
                })
            }
        };
    }

    Ok(cursor.insert(last.to_string(), value))
}

/// Walk the existing part of `parents`, reporting the first non-object value.
fn check_writable(document: &Document, key_path: &KeyPath, parents: &[String]) -> Result<()> {
    let mut cursor = document;
    for (depth, key) in parents.iter().enumerate() {
        match cursor.get(key.as_str()) {
            Some(Value::Object(map)) => cursor = map,
            Some(other) => {
                return Err(Error::PathConflict {
                    key_path: key_path.prefix(depth + 1),
                    found: json_type_name(other),
                })
            }
            None => return Ok(()),
        }
    }
    Ok(())
}

/// Remove the value at `key_path`.
///
/// Returns `Ok(None)` without touching the document when the path does not
/// resolve. Only an empty key path is an error.
pub fn remove_path(document: &mut Document, key_path: &KeyPath) -> Result<Option<Value>> {
    let (parents, last) = key_path.split_last()?;

    let mut cursor = document;
    for key in parents {
        match cursor.get_mut(key.as_str()) {
            Some(Value::Object(map)) => cursor = map,
            _ => {
                log::trace!("Nothing to remove at {}: {:?} does not resolve", key_path, key);
                return Ok(None);
            }
        }
    }

    Ok(cursor.shift_remove(last))
}

/// Keys of the top-level entries whose value satisfies `predicate`, in document order.
pub fn select<F>(document: &Document, mut predicate: F) -> Vec<String>
where
    F: FnMut(&Value) -> bool,
{
    document
        .iter()
        .filter(|(_, value)| predicate(value))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Keys of the top-level entries holding an integral number within `range`.
///
/// Floats count only when they have no fractional part, so `3.0` is in
/// `0..10` but `3.5` is not.
pub fn select_range<R>(document: &Document, range: R) -> Vec<String>
where
    R: RangeBounds<i64>,
{
    select(document, |value| match integral(value) {
        Some(n) => contains_wide(&range, n),
        None => false,
    })
}

fn integral(value: &Value) -> Option<i128> {
    let number = value.as_number()?;
    if let Some(i) = number.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = number.as_u64() {
        return Some(u as i128);
    }
    let f = number.as_f64()?;
    if f.fract() == 0.0 && f.abs() < 1e38 {
        Some(f as i128)
    } else {
        None
    }
}

fn contains_wide<R: RangeBounds<i64>>(range: &R, n: i128) -> bool {
    let above_start = match range.start_bound() {
        Bound::Included(&start) => n >= start as i128,
        Bound::Excluded(&start) => n > start as i128,
        Bound::Unbounded => true,
    };
    let below_end = match range.end_bound() {
        Bound::Included(&end) => n <= end as i128,
        Bound::Excluded(&end) => n < end as i128,
        Bound::Unbounded => true,
    };
    above_start && below_end
}

/// Parse JSON text into a document, rejecting non-object top-level values.
pub fn parse_document(text: &str) -> std::result::Result<Document, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!(
            "expected a JSON object at the top level, found {}",
            json_type_name(&other)
        )),
        Err(e) => Err(e.to_string()),
    }
}

/// Render a document as JSON text for a file in `encoding`.
///
/// With `Some(indent)` the output is pretty-printed with that many spaces per
/// level, otherwise it is compact. Characters the encoding cannot hold are
/// written as `\uXXXX` escapes, so the text always encodes cleanly.
pub fn render_document(
    document: &Document,
    indent: Option<usize>,
    encoding: Encoding,
) -> Result<String> {
    let mut out = Vec::new();
    match indent {
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            serialize_with(&mut out, document, formatter, encoding)?
        }
        None => serialize_with(&mut out, document, CompactFormatter, encoding)?,
    }
    String::from_utf8(out).map_err(|e| Error::Serialize {
        message: e.to_string(),
    })
}

fn serialize_with<F: Formatter>(
    out: &mut Vec<u8>,
    document: &Document,
    formatter: F,
    encoding: Encoding,
) -> Result<()> {
    let formatter = EscapingFormatter {
        inner: formatter,
        encoding,
    };
    let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| Error::Serialize {
            message: e.to_string(),
        })
}

/// Escapes string characters outside `encoding`, delegating layout to `inner`.
struct EscapingFormatter<F> {
    inner: F,
    encoding: Encoding,
}

impl<F: Formatter> Formatter for EscapingFormatter<F> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if self.encoding.can_encode(c) {
                continue;
            }
            if start < i {
                self.inner.write_string_fragment(writer, &fragment[start..i])?;
            }
            // Astral characters become a surrogate pair.
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        if start < fragment.len() {
            self.inner.write_string_fragment(writer, &fragment[start..])?;
        }
        Ok(())
    }
}
