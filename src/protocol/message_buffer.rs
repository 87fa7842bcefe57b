//! Message buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for buffer management.
//! Implements a state machine for reassembling chunked messages:
//! - `WaitingForChunkHeader`: Need 2 bytes of chunk size
//! - `WaitingForChunkBody`: Size parsed, need N more bytes of chunk data
//!
//! # Example
//!
//! ```
//! use packstream_client::protocol::{build_message, MessageBuffer};
//!
//! let mut buffer = MessageBuffer::new();
//! let wire = build_message(b"payload");
//!
//! // Data arrives in arbitrary pieces from the socket
//! assert!(buffer.push(&wire[..4]).unwrap().is_empty());
//! let messages = buffer.push(&wire[4..]).unwrap();
//! assert_eq!(&messages[0][..], b"payload");
//! ```

use bytes::{Buf, Bytes, BytesMut};

use super::chunk::CHUNK_HEADER_SIZE;
use crate::error::{PackStreamError, Result};

/// Default maximum reassembled message size (16 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// State machine for chunk parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for a complete chunk size prefix.
    WaitingForChunkHeader,
    /// Size parsed, waiting for chunk data.
    WaitingForChunkBody { remaining: usize },
}

/// Buffer for accumulating incoming bytes and extracting complete messages.
pub struct MessageBuffer {
    /// Bytes received but not yet parsed.
    buffer: BytesMut,
    /// Chunk data of the message being reassembled.
    message: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed message size.
    max_message_size: usize,
}

impl MessageBuffer {
    /// Create a new message buffer with default settings.
    ///
    /// Default capacity: 64KB, max message: 16MB.
    pub fn new() -> Self {
        Self::with_max_message_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a new message buffer with custom max message size.
    pub fn with_max_message_size(max_message_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            message: BytesMut::new(),
            state: State::WaitingForChunkHeader,
            max_message_size,
        }
    }

    /// Push data into the buffer and extract all complete messages.
    ///
    /// Partial data is buffered internally for the next push. Keep-alive
    /// end markers with no preceding chunks produce no message.
    ///
    /// # Errors
    ///
    /// Returns `Protocol` if a message grows past `max_message_size`. Messages
    /// completed before the offending chunk header are returned first; the
    /// header is left unconsumed, so the next call reports the error.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>> {
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        loop {
            match self.try_extract_one() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(e) if messages.is_empty() => return Err(e),
                Err(_) => break,
            }
        }
        Ok(messages)
    }

    /// Try to extract a single message from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(message))` if a complete message was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` if the message is too large
    fn try_extract_one(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                State::WaitingForChunkHeader => {
                    if self.buffer.len() < CHUNK_HEADER_SIZE {
                        return Ok(None);
                    }
                    let size = usize::from(u16::from_be_bytes([self.buffer[0], self.buffer[1]]));

                    // Validate before consuming so a rejected header stays in place
                    if size > 0 && self.message.len() + size > self.max_message_size {
                        return Err(PackStreamError::Protocol(format!(
                            "Message size {} exceeds maximum {}",
                            self.message.len() + size,
                            self.max_message_size
                        )));
                    }
                    self.buffer.advance(CHUNK_HEADER_SIZE);

                    if size == 0 {
                        if self.message.is_empty() {
                            tracing::trace!("Received keep-alive");
                            continue;
                        }
                        return Ok(Some(self.message.split().freeze()));
                    }

                    self.state = State::WaitingForChunkBody { remaining: size };
                }

                State::WaitingForChunkBody { remaining } => {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let take = remaining.min(self.buffer.len());
                    self.message.extend_from_slice(&self.buffer.split_to(take));

                    self.state = if take == remaining {
                        State::WaitingForChunkHeader
                    } else {
                        State::WaitingForChunkBody {
                            remaining: remaining - take,
                        }
                    };
                }
            }
        }
    }

    /// Number of received bytes not yet assigned to a message.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether no bytes are pending, including a partly reassembled message.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.message.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.message.clear();
        self.state = State::WaitingForChunkHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForChunkHeader => "WaitingForChunkHeader",
            State::WaitingForChunkBody { .. } => "WaitingForChunkBody",
        }
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}
