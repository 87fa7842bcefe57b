//! Client configuration.
//!
//! Usually set through [`ClientBuilder`](crate::ClientBuilder), or loaded from
//! JSON where every field is optional:
//!
//! ```
//! use packstream_client::ClientConfig;
//!
//! let config = ClientConfig::from_json_str(r#"{ "user_agent": "my-app/1.0" }"#).unwrap();
//! assert_eq!(config.user_agent, "my-app/1.0");
//! assert_eq!(config.max_chunk_size, packstream_client::protocol::MAX_CHUNK_SIZE);
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::protocol::{Version, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_PROPOSALS, MAX_CHUNK_SIZE};

/// Default user agent sent in `hello`.
pub const DEFAULT_USER_AGENT: &str = concat!("packstream-client/", env!("CARGO_PKG_VERSION"));

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default socket read buffer size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// User agent sent in `hello`.
    pub user_agent: String,
    /// Versions proposed in the handshake, most preferred first (1-4).
    pub versions: Vec<Version>,
    /// Largest chunk written when framing outgoing messages.
    pub max_chunk_size: usize,
    /// Largest incoming message accepted.
    pub max_message_size: usize,
    /// TCP connect timeout.
    #[serde(with = "duration_ms", rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,
    /// Bytes requested per socket read.
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            versions: DEFAULT_PROPOSALS.to_vec(),
            max_chunk_size: MAX_CHUNK_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
