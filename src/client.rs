//! Client builder and connection.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the client.
//! The [`Client`] manages one connection:
//! 1. Connect (TCP) or take an already connected stream
//! 2. Send the version handshake and read the server's choice
//! 3. Exchange chunked messages carrying PackStream values
//!
//! # Example
//!
//! ```ignore
//! use packstream_client::{AuthToken, Client, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::builder()
//!         .user_agent("my-app/1.0")
//!         .connect("127.0.0.1:7687")
//!         .await?;
//!
//!     client.hello(&AuthToken::basic("neo4j", "password")).await?;
//!     let reply: Value = client.receive().await?;
//!     println!("{:?}", reply);
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::auth::AuthToken;
use crate::codec::PackStreamCodec;
use crate::config::ClientConfig;
use crate::error::{PackStreamError, Result};
use crate::protocol::{
    build_message_with_chunk_size, decode_version_response, encode_handshake, MessageBuffer,
    Version, VERSION_RESPONSE_SIZE,
};
use crate::value::Value;

/// Builder for configuring and creating a client.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Set the user agent sent in `hello`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the versions proposed during the handshake, most preferred first.
    ///
    /// At most four are allowed; the handshake fails otherwise.
    pub fn versions(mut self, versions: impl Into<Vec<Version>>) -> Self {
        self.config.versions = versions.into();
        self
    }

    /// Set the largest chunk used when framing outgoing messages.
    ///
    /// Default: 65535
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Set the largest incoming message accepted.
    ///
    /// Default: 16 MB
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the TCP connect timeout.
    ///
    /// Default: 30 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the number of bytes requested per socket read.
    ///
    /// Default: 64 KB
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a TCP connection and perform the handshake.
    pub async fn connect<A: ToSocketAddrs>(self, addr: A) -> Result<Client<TcpStream>> {
        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| PackStreamError::ConnectTimeout)??;
        stream.set_nodelay(true)?;
        if let Ok(peer) = stream.peer_addr() {
            tracing::debug!(%peer, "TCP connection established");
        }
        self.handshake(stream).await
    }

    /// Perform the handshake over an already connected stream.
    pub async fn handshake<S>(self, stream: S) -> Result<Client<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        Client::handshake(stream, self.config).await
    }
}

/// A connected client.
///
/// One client owns one stream; calls are sequential (`&mut self`), so reads
/// and writes on the stream are never interleaved.
pub struct Client<S> {
    stream: S,
    version: Version,
    config: ClientConfig,
    buffer: MessageBuffer,
    /// Complete messages not yet decoded.
    inbox: VecDeque<Bytes>,
    /// Values decoded from received messages but not yet returned.
    pending: VecDeque<Value>,
    read_buf: Vec<u8>,
}

impl Client<TcpStream> {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn handshake(mut stream: S, config: ClientConfig) -> Result<Self> {
        let preamble = encode_handshake(&config.versions)?;
        stream.write_all(&preamble).await?;
        stream.flush().await?;

        let mut response = [0u8; VERSION_RESPONSE_SIZE];
        read_exact(&mut stream, &mut response).await?;
        let version = decode_version_response(response)?;
        tracing::info!(%version, "Handshake complete");

        Ok(Self {
            stream,
            version,
            buffer: MessageBuffer::with_max_message_size(config.max_message_size),
            inbox: VecDeque::new(),
            pending: VecDeque::new(),
            read_buf: vec![0u8; config.read_buffer_size.max(1)],
            config,
        })
    }

    /// Protocol version agreed during the handshake.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one value as a message.
    pub async fn send(&mut self, value: &Value) -> Result<()> {
        self.send_message(std::slice::from_ref(value)).await
    }

    /// Send several values as a single message.
    pub async fn send_message(&mut self, values: &[Value]) -> Result<()> {
        let mut payload = Vec::new();
        for value in values {
            crate::codec::encode(value, &mut payload)?;
        }
        let message = build_message_with_chunk_size(&payload, self.config.max_chunk_size);
        tracing::debug!(
            values = values.len(),
            payload_len = payload.len(),
            "Sending message"
        );

        self.stream.write_all(&message).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Receive the next value.
    ///
    /// Values from a message holding several are returned one per call, in
    /// order. A message is decoded whole before any of its values is
    /// returned, so a malformed message yields an error and nothing else;
    /// messages after it are still delivered by later calls.
    ///
    /// # Errors
    ///
    /// `ConnectionClosed` if the peer closes the stream first; any decode
    /// error for a malformed message.
    pub async fn receive(&mut self) -> Result<Value> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                return Ok(value);
            }

            if let Some(message) = self.inbox.pop_front() {
                tracing::debug!(payload_len = message.len(), "Received message");
                self.pending.extend(decode_message(&message)?);
                continue;
            }

            // Surface an error deferred by a push that also returned messages
            let leftover = self.buffer.push(&[])?;
            if !leftover.is_empty() {
                self.inbox.extend(leftover);
                continue;
            }

            let n = self.stream.read(&mut self.read_buf).await?;
            if n == 0 {
                return Err(PackStreamError::ConnectionClosed);
            }
            self.inbox.extend(self.buffer.push(&self.read_buf[..n])?);
        }
    }

    /// Send the `hello` message: the auth token fields plus `user_agent`.
    pub async fn hello(&mut self, auth: &AuthToken) -> Result<()> {
        let mut fields = match auth.to_value() {
            Value::Map(fields) => fields,
            other => {
                return Err(PackStreamError::UnsupportedValueType(format!(
                    "auth token must be a Map, found {}",
                    other.type_name()
                )))
            }
        };
        fields.insert(
            "user_agent".to_string(),
            Value::from(self.config.user_agent.as_str()),
        );
        tracing::debug!(scheme = %auth.scheme, principal = %auth.principal, "Sending hello");
        self.send(&Value::Map(fields)).await
    }

    /// Shut down the write side of the stream and drop the client.
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Take back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Decode every value in one message payload.
fn decode_message(mut payload: &[u8]) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    while !payload.is_empty() {
        let (value, consumed) = PackStreamCodec::decode_prefix(payload)?;
        values.push(value);
        payload = &payload[consumed..];
    }
    Ok(values)
}

/// Fill `buf` from an async stream, reporting how far it got on EOF.
async fn read_exact<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(PackStreamError::UnexpectedEnd {
                expected: buf.len(),
                actual: filled,
            });
        }
        filled += n;
    }
    Ok(())
}
