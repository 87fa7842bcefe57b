//! Connection handshake encoding and decoding.
//!
//! Before any PackStream traffic the client sends a fixed 20-byte preamble:
//! ```text
//! ┌──────────────┬────────────┬────────────┬────────────┬────────────┐
//! │ Magic        │ Proposal 1 │ Proposal 2 │ Proposal 3 │ Proposal 4 │
//! │ 60 60 B0 17  │ 4 bytes    │ 4 bytes    │ 4 bytes    │ 4 bytes    │
//! └──────────────┴────────────┴────────────┴────────────┴────────────┘
//! ```
//!
//! Each proposal is `[0x00, range, minor, major]`: it offers `major.minor`
//! and the `range` minor versions below it. Unused slots are all zero.
//! The server answers with 4 bytes in the same layout naming the chosen
//! version, or all zeros if none was acceptable.

use serde::Deserialize;

use crate::error::{PackStreamError, Result};

/// Identification preamble.
pub const MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

/// Number of version slots in the handshake.
pub const MAX_PROPOSALS: usize = 4;

/// Handshake size in bytes (magic + four proposals).
pub const HANDSHAKE_SIZE: usize = 4 + MAX_PROPOSALS * 4;

/// Server response size in bytes.
pub const VERSION_RESPONSE_SIZE: usize = 4;

/// Versions proposed when none are configured: 4.3 (down to 4.0), 4.1, 4.0, 3.0.
pub const DEFAULT_PROPOSALS: [Version; MAX_PROPOSALS] = [
    Version::with_range(4, 3, 3),
    Version::new(4, 1),
    Version::new(4, 0),
    Version::new(3, 0),
];

/// A protocol version, optionally covering a range of minor versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    /// How many minor versions below `minor` are also acceptable.
    #[serde(default)]
    pub range: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            range: 0,
        }
    }

    pub const fn with_range(major: u8, minor: u8, range: u8) -> Self {
        Self {
            major,
            minor,
            range,
        }
    }

    /// Wire form: `[0, range, minor, major]`.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 4] {
        [0, self.range, self.minor, self.major]
    }

    /// Parse a server response. `None` means no version was agreed.
    pub fn from_response(bytes: [u8; VERSION_RESPONSE_SIZE]) -> Option<Self> {
        if bytes == [0; VERSION_RESPONSE_SIZE] {
            return None;
        }
        Some(Self::new(bytes[3], bytes[2]))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Build the 20-byte handshake for up to four proposals, in preference order.
///
/// # Example
///
/// ```
/// use packstream_client::protocol::{encode_handshake, Version, HANDSHAKE_SIZE};
///
/// let bytes = encode_handshake(&[Version::new(4, 1)]).unwrap();
/// assert_eq!(bytes.len(), HANDSHAKE_SIZE);
/// assert_eq!(&bytes[4..8], &[0, 0, 1, 4]);
/// ```
///
/// # Errors
///
/// `Protocol` if no proposals or more than four are given.
pub fn encode_handshake(proposals: &[Version]) -> Result<[u8; HANDSHAKE_SIZE]> {
    if proposals.is_empty() {
        return Err(PackStreamError::Protocol(
            "At least one version proposal is required".to_string(),
        ));
    }
    if proposals.len() > MAX_PROPOSALS {
        return Err(PackStreamError::Protocol(format!(
            "At most {} version proposals allowed, got {}",
            MAX_PROPOSALS,
            proposals.len()
        )));
    }

    let mut buf = [0u8; HANDSHAKE_SIZE];
    buf[..4].copy_from_slice(&MAGIC);
    for (slot, version) in buf[4..].chunks_exact_mut(4).zip(proposals) {
        slot.copy_from_slice(&version.to_bytes());
    }
    Ok(buf)
}

/// Parse the server's version response.
///
/// # Errors
///
/// `NoCommonVersion` if the server answered with all zeros.
pub fn decode_version_response(bytes: [u8; VERSION_RESPONSE_SIZE]) -> Result<Version> {
    Version::from_response(bytes).ok_or(PackStreamError::NoCommonVersion)
}
