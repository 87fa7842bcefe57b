//! Error types for packstream-client.

use thiserror::Error;

/// Main error type for all codec and connection operations.
#[derive(Debug, Error)]
pub enum PackStreamError {
    /// I/O error during socket or stream operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ended (or the sink stopped accepting bytes) before the
    /// requested byte count was transferred.
    #[error("Unexpected end of stream: expected {expected} bytes, got {actual}")]
    UnexpectedEnd {
        /// Bytes requested.
        expected: usize,
        /// Bytes actually transferred before the stream ended.
        actual: usize,
    },

    /// A value (or map key) of a type the format cannot carry.
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// Marker byte outside the defined table.
    #[error("Unrecognized marker byte: 0x{0:02X}")]
    UnrecognizedMarker(u8),

    /// Text payload is not valid UTF-8.
    #[error("Invalid UTF-8 in text payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Text length or map size does not fit a 32-bit size field.
    #[error("{kind} size {size} exceeds maximum {max}")]
    SizeOverflow {
        /// Which variable-length variant overflowed ("Text" or "Map").
        kind: &'static str,
        /// Actual length or entry count.
        size: usize,
        /// Largest representable size.
        max: u32,
    },

    /// Bytes left over after decoding a complete value from a buffer.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Maps nested deeper than the decoder allows.
    #[error("Nesting depth exceeds maximum {0}")]
    NestingTooDeep(usize),

    /// Protocol error (bad handshake, oversized message, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server rejected every proposed protocol version.
    #[error("Server supports none of the proposed protocol versions")]
    NoCommonVersion,

    /// TCP connect did not complete within the configured timeout.
    #[error("Connect timeout")]
    ConnectTimeout,

    /// JSON error (configuration loading and value conversion).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,
}

impl PackStreamError {
    /// Whether this error means the input simply ran out of bytes.
    #[inline]
    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, PackStreamError::UnexpectedEnd { .. })
    }
}

/// Result type alias using PackStreamError.
pub type Result<T> = std::result::Result<T, PackStreamError>;
