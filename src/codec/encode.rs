//! Value encoder.
//!
//! Writes the canonical marker + payload bytes for a [`Value`], always picking
//! the smallest size class that fits. Map entries are written key first, in
//! ascending key order.

use std::collections::BTreeMap;

use super::io::ByteSink;
use super::marker::{self, IntHeader};
use crate::error::Result;
use crate::value::Value;

/// Encode one value into `sink`.
///
/// # Errors
///
/// Fails with `SizeOverflow` if a text or map is too large for a 32-bit size
/// field, or with whatever error the sink returns. Nothing is retried; on error
/// the sink may hold a partially written value.
pub fn encode<S: ByteSink + ?Sized>(value: &Value, sink: &mut S) -> Result<()> {
    match value {
        Value::Null => sink.put_exact(&[marker::NULL]),
        Value::Boolean(true) => sink.put_exact(&[marker::TRUE]),
        Value::Boolean(false) => sink.put_exact(&[marker::FALSE]),
        Value::Integer(i) => encode_integer(*i, sink),
        Value::Text(s) => encode_text(s, sink),
        Value::Map(m) => encode_map(m, sink),
    }
}

/// Encode an integer using the smallest fitting form.
#[inline]
pub fn encode_integer<S: ByteSink + ?Sized>(i: i64, sink: &mut S) -> Result<()> {
    sink.put_exact(IntHeader::for_value(i).as_bytes())
}

/// Encode text: size header, then the raw UTF-8 bytes.
pub fn encode_text<S: ByteSink + ?Sized>(s: &str, sink: &mut S) -> Result<()> {
    let header = marker::TEXT.header(s.len())?;
    sink.put_exact(header.as_bytes())?;
    sink.put_exact(s.as_bytes())
}

/// Encode a map: size header, then each key (as text) followed by its value.
pub fn encode_map<S: ByteSink + ?Sized>(map: &BTreeMap<String, Value>, sink: &mut S) -> Result<()> {
    let header = marker::MAP.header(map.len())?;
    sink.put_exact(header.as_bytes())?;
    for (key, value) in map {
        encode_text(key, sink)?;
        encode(value, sink)?;
    }
    Ok(())
}
