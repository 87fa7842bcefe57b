//! Codec module - PackStream value encoding and decoding.
//!
//! - [`marker`] - marker byte table and size-class selection
//! - [`encode()`] / [`decode()`] - streaming encoder and decoder over a
//!   [`ByteSink`] / [`ByteSource`]
//! - [`PackStreamCodec`] - convenience entry points over buffers and
//!   `std::io` streams
//!
//! # Design
//!
//! The codec holds no state between calls. It borrows the sink or source for
//! one call and never retains or closes it. Raw `std::io` streams are wrapped
//! in [`ExactReader`] / [`ExactWriter`] so partial transfers are never mistaken
//! for complete ones.
//!
//! # Example
//!
//! ```
//! use packstream_client::codec::PackStreamCodec;
//! use packstream_client::Value;
//!
//! let encoded = PackStreamCodec::encode(&Value::from("A")).unwrap();
//! assert_eq!(encoded, vec![0x81, 0x41]);
//!
//! let decoded = PackStreamCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, Value::from("A"));
//! ```

mod decode;
mod encode;
mod io;
pub mod marker;

use std::io::{Read, Write};

use bytes::BytesMut;

pub use decode::{decode, MAX_NESTING_DEPTH};
pub use encode::{encode, encode_integer, encode_map, encode_text};
pub use io::{ByteSink, ByteSource, ExactReader, ExactWriter};

use crate::error::{PackStreamError, Result};
use crate::value::Value;

/// PackStream codec for single values.
pub struct PackStreamCodec;

impl PackStreamCodec {
    /// Encode a value to a new byte vector.
    ///
    /// # Errors
    ///
    /// Returns `SizeOverflow` if a text or map is too large to encode.
    #[inline]
    pub fn encode(value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        encode(value, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of a value to `buf`.
    #[inline]
    pub fn encode_into(value: &Value, buf: &mut BytesMut) -> Result<()> {
        encode(value, buf)
    }

    /// Decode exactly one value from `bytes`.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not a complete value, or with `TrailingBytes`
    /// if anything follows it.
    pub fn decode(bytes: &[u8]) -> Result<Value> {
        let (value, consumed) = Self::decode_prefix(bytes)?;
        if consumed != bytes.len() {
            return Err(PackStreamError::TrailingBytes(bytes.len() - consumed));
        }
        Ok(value)
    }

    /// Decode the value at the start of `bytes`.
    ///
    /// Returns the value and the number of bytes it occupied.
    pub fn decode_prefix(bytes: &[u8]) -> Result<(Value, usize)> {
        let mut rest = bytes;
        let value = decode(&mut rest)?;
        Ok((value, bytes.len() - rest.len()))
    }

    /// Encode a value straight into a `std::io::Write`.
    ///
    /// Short writes are retried until every byte is written; the writer is
    /// not flushed.
    pub fn write_to<W: Write>(value: &Value, writer: W) -> Result<()> {
        encode(value, &mut ExactWriter::new(writer))
    }

    /// Decode one value from a `std::io::Read`.
    ///
    /// Reads only the bytes belonging to that value.
    pub fn read_from<R: Read>(reader: R) -> Result<Value> {
        decode(&mut ExactReader::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_decode_roundtrip() {
        let original = Value::map([
            ("null", Value::Null),
            ("yes", Value::Boolean(true)),
            ("no", Value::Boolean(false)),
            ("small", Value::Integer(-16)),
            ("big", Value::Integer(i64::MIN)),
            ("empty", Value::from("")),
            ("text", Value::from("hello world")),
            ("nested", Value::map([("deeper", Value::Map(BTreeMap::new()))])),
        ]);

        let encoded = PackStreamCodec::encode(&original).unwrap();
        let decoded = PackStreamCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encode_into_appends() {
        let mut buf = BytesMut::from(&[0xAA][..]);
        PackStreamCodec::encode_into(&Value::Null, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0xAA, 0xC0]);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let err = PackStreamCodec::decode(&[0xC0, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, PackStreamError::TrailingBytes(2)));
    }

    #[test]
    fn test_decode_prefix_reports_consumed() {
        let bytes = [0x81, b'A', 0xC3];
        let (value, consumed) = PackStreamCodec::decode_prefix(&bytes).unwrap();
        assert_eq!(value, Value::from("A"));
        assert_eq!(consumed, 2);

        let (value, consumed) = PackStreamCodec::decode_prefix(&bytes[consumed..]).unwrap();
        assert_eq!(value, Value::Boolean(true));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_stream_roundtrip_leaves_following_bytes() {
        let mut wire = Vec::new();
        PackStreamCodec::write_to(&Value::Integer(1_000_000), &mut wire).unwrap();
        PackStreamCodec::write_to(&Value::from("next"), &mut wire).unwrap();

        let mut reader = std::io::Cursor::new(wire);
        assert_eq!(
            PackStreamCodec::read_from(&mut reader).unwrap(),
            Value::Integer(1_000_000)
        );
        assert_eq!(
            PackStreamCodec::read_from(&mut reader).unwrap(),
            Value::from("next")
        );
        assert!(PackStreamCodec::read_from(&mut reader)
            .unwrap_err()
            .is_unexpected_end());
    }
}
