//! Value decoder.
//!
//! Reads one marker byte, dispatches on it and reconstructs a [`Value`],
//! recursing for map keys and values. A failure anywhere inside a map fails
//! the whole decode; no partial map is returned.

use std::collections::BTreeMap;

use super::io::ByteSource;
use super::marker::{Marker, Size, Width};
use crate::error::{PackStreamError, Result};
use crate::value::Value;

/// Deepest map nesting the decoder accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Decode one value from `source`.
///
/// # Errors
///
/// - `UnexpectedEnd` / `Io` if the source runs dry or fails mid-value
/// - `UnrecognizedMarker` for a marker byte outside the table
/// - `InvalidUtf8` for text that is not UTF-8
/// - `UnsupportedValueType` for a map key that is not text
/// - `NestingTooDeep` past [`MAX_NESTING_DEPTH`] nested maps
pub fn decode<S: ByteSource + ?Sized>(source: &mut S) -> Result<Value> {
    decode_nested(source, 0)
}

fn decode_nested<S: ByteSource + ?Sized>(source: &mut S, depth: usize) -> Result<Value> {
    let byte = source.read_u8()?;
    let marker = Marker::from_byte(byte).ok_or(PackStreamError::UnrecognizedMarker(byte))?;

    match marker {
        Marker::Null => Ok(Value::Null),
        Marker::Boolean(b) => Ok(Value::Boolean(b)),
        Marker::TinyInt(i) => Ok(Value::Integer(i64::from(i))),
        Marker::Int(width) => read_signed(source, width).map(Value::Integer),
        Marker::Text(size) => {
            let len = read_size(source, size)?;
            read_text(source, len).map(Value::Text)
        }
        Marker::Map(size) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(PackStreamError::NestingTooDeep(MAX_NESTING_DEPTH));
            }
            let entries = read_size(source, size)?;
            read_map(source, entries, depth + 1).map(Value::Map)
        }
    }
}

/// Read a big-endian two's-complement integer and sign-extend it.
fn read_signed<S: ByteSource + ?Sized>(source: &mut S, width: Width) -> Result<i64> {
    let mut buf = [0u8; 8];
    source.fill_exact(&mut buf[..width.bytes()])?;
    let value = match width {
        Width::One => i64::from(i8::from_be_bytes([buf[0]])),
        Width::Two => i64::from(i16::from_be_bytes([buf[0], buf[1]])),
        Width::Four => i64::from(i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])),
        Width::Eight => i64::from_be_bytes(buf),
    };
    Ok(value)
}

/// Resolve a text length or map size. Size fields are unsigned.
fn read_size<S: ByteSource + ?Sized>(source: &mut S, size: Size) -> Result<usize> {
    match size {
        Size::Inline(n) => Ok(usize::from(n)),
        Size::Prefixed(width) => {
            let mut buf = [0u8; 4];
            source.fill_exact(&mut buf[4 - width.bytes()..])?;
            Ok(u32::from_be_bytes(buf) as usize)
        }
    }
}

fn read_text<S: ByteSource + ?Sized>(source: &mut S, len: usize) -> Result<String> {
    let bytes = source.take_exact(len)?;
    Ok(String::from_utf8(bytes)?)
}

fn read_map<S: ByteSource + ?Sized>(
    source: &mut S,
    entries: usize,
    depth: usize,
) -> Result<BTreeMap<String, Value>> {
    let mut map = BTreeMap::new();
    for _ in 0..entries {
        let key = match decode_nested(source, depth)? {
            Value::Text(key) => key,
            other => {
                return Err(PackStreamError::UnsupportedValueType(format!(
                    "map key must be Text, found {}",
                    other.type_name()
                )))
            }
        };
        let value = decode_nested(source, depth)?;
        map.insert(key, value);
    }
    Ok(map)
}
