//! # packstream-client
//!
//! PackStream value codec and a minimal Bolt connection client.
//!
//! PackStream is the self-describing, length-prefixed binary format used on
//! the Bolt database wire protocol. This crate converts [`Value`]s (null,
//! boolean, integer, text and text-keyed maps) to and from their canonical
//! bytes, always choosing the smallest encoding that fits.
//!
//! ## Architecture
//!
//! - **Codec** ([`codec`]): stateless encoder/decoder over exact-count byte
//!   sinks and sources
//! - **Protocol** ([`protocol`]): version handshake and chunked message framing
//! - **Client** ([`Client`]): tokio connection tying the two together
//!
//! ## Example
//!
//! ```
//! use packstream_client::codec::PackStreamCodec;
//! use packstream_client::Value;
//!
//! let token = Value::map([
//!     ("scheme", Value::from("basic")),
//!     ("principal", Value::from("neo4j")),
//! ]);
//!
//! let bytes = PackStreamCodec::encode(&token).unwrap();
//! assert_eq!(bytes[0], 0xA2);
//! assert_eq!(PackStreamCodec::decode(&bytes).unwrap(), token);
//! ```

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod value;

mod client;

pub use auth::AuthToken;
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::PackStreamError;
pub use value::Value;
