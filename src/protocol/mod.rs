//! Protocol module - handshake and message framing.
//!
//! This module implements the connection-level protocol around the codec:
//! - 20-byte version handshake and 4-byte version response
//! - Chunked message framing
//! - Message buffer for reassembling messages from partial reads

mod chunk;
mod handshake;
mod message_buffer;

pub use chunk::{
    build_message, build_message_with_chunk_size, CHUNK_HEADER_SIZE, END_OF_MESSAGE,
    MAX_CHUNK_SIZE,
};
pub use handshake::{
    decode_version_response, encode_handshake, Version, DEFAULT_PROPOSALS, HANDSHAKE_SIZE, MAGIC,
    MAX_PROPOSALS, VERSION_RESPONSE_SIZE,
};
pub use message_buffer::{MessageBuffer, DEFAULT_MAX_MESSAGE_SIZE};
