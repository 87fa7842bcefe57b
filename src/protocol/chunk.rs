//! Chunked message framing.
//!
//! A message (one or more encoded values) is cut into chunks, each prefixed
//! with its size, and closed by an empty chunk:
//! ```text
//! ┌───────────┬────────────┬─────┬───────────┬────────────┬───────┐
//! │ Size      │ Data       │ ... │ Size      │ Data       │ 00 00 │
//! │ uint16 BE │ Size bytes │     │ uint16 BE │ Size bytes │ end   │
//! └───────────┴────────────┴─────┴───────────┴────────────┴───────┘
//! ```
//!
//! A lone `00 00` with no chunks before it carries no message and is used
//! as a keep-alive.
//!
//! # Example
//!
//! ```
//! use packstream_client::protocol::build_message;
//!
//! let bytes = build_message(&[0xC0]);
//! assert_eq!(&bytes[..], &[0x00, 0x01, 0xC0, 0x00, 0x00]);
//! ```

use bytes::{BufMut, BytesMut};

/// Chunk size prefix in bytes.
pub const CHUNK_HEADER_SIZE: usize = 2;

/// Largest chunk a size prefix can describe.
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

/// Empty chunk that terminates a message.
pub const END_OF_MESSAGE: [u8; CHUNK_HEADER_SIZE] = [0x00, 0x00];

/// Frame a message payload using the largest chunk size.
#[inline]
pub fn build_message(payload: &[u8]) -> BytesMut {
    build_message_with_chunk_size(payload, MAX_CHUNK_SIZE)
}

/// Frame a message payload, splitting it into chunks of at most `chunk_size`
/// bytes.
///
/// `chunk_size` is clamped to `1..=MAX_CHUNK_SIZE`. An empty payload yields
/// just the end marker.
pub fn build_message_with_chunk_size(payload: &[u8], chunk_size: usize) -> BytesMut {
    let chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
    let chunks = payload.len().div_ceil(chunk_size);
    let mut buf =
        BytesMut::with_capacity(payload.len() + chunks * CHUNK_HEADER_SIZE + END_OF_MESSAGE.len());

    for chunk in payload.chunks(chunk_size) {
        // chunk_size <= u16::MAX
        buf.put_u16(chunk.len() as u16);
        buf.put_slice(chunk);
    }
    buf.put_slice(&END_OF_MESSAGE);
    buf
}
