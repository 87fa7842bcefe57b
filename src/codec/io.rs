//! Exact-byte-count I/O for the codec.
//!
//! The codec only ever sees all-or-nothing transfers: a [`ByteSource`] either
//! fills the whole requested buffer or fails with `UnexpectedEnd`, and a
//! [`ByteSink`] either accepts every byte or fails.
//!
//! Raw `std::io` streams may return short reads and writes, so they are wrapped
//! in [`ExactReader`] / [`ExactWriter`], which loop until the count is reached.
//!
//! # Example
//!
//! ```
//! use packstream_client::codec::{ByteSource, ExactReader};
//!
//! let mut source = ExactReader::new(&b"\x01\x02\x03"[..]);
//! assert_eq!(source.take_exact(2).unwrap(), vec![1, 2]);
//! assert!(source.take_exact(2).unwrap_err().is_unexpected_end());
//! ```

use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{PackStreamError, Result};

/// Chunk used when growing a buffer for a declared payload length.
const READ_CHUNK: usize = 64 * 1024;

/// Destination for encoded bytes.
pub trait ByteSink {
    /// Write all of `bytes` or fail.
    fn put_exact(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Source of bytes to decode.
pub trait ByteSource {
    /// Fill `buf` completely or fail with `UnexpectedEnd`.
    fn fill_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Read exactly `n` bytes into a new vector.
    ///
    /// The vector grows as bytes arrive rather than being sized from `n`
    /// up front, so a bogus length cannot force a large allocation.
    fn take_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n.min(READ_CHUNK));
        while out.len() < n {
            let start = out.len();
            let step = (n - start).min(READ_CHUNK);
            out.resize(start + step, 0);
            if let Err(e) = self.fill_exact(&mut out[start..]) {
                return Err(match e {
                    PackStreamError::UnexpectedEnd { actual, .. } => {
                        PackStreamError::UnexpectedEnd {
                            expected: n,
                            actual: start + actual,
                        }
                    }
                    other => other,
                });
            }
        }
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn put_exact(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).put_exact(bytes)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn fill_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).fill_exact(buf)
    }

    #[inline]
    fn take_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        (**self).take_exact(n)
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn put_exact(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl ByteSink for BytesMut {
    #[inline]
    fn put_exact(&mut self, bytes: &[u8]) -> Result<()> {
        self.put_slice(bytes);
        Ok(())
    }
}

/// In-memory source. Consumed bytes are dropped from the front of the slice.
impl ByteSource for &[u8] {
    fn fill_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.len() < buf.len() {
            let actual = self.len();
            *self = &self[actual..];
            return Err(PackStreamError::UnexpectedEnd {
                expected: buf.len(),
                actual,
            });
        }
        let (head, tail) = self.split_at(buf.len());
        buf.copy_from_slice(head);
        *self = tail;
        Ok(())
    }

    fn take_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        if self.len() < n {
            let actual = self.len();
            *self = &self[actual..];
            return Err(PackStreamError::UnexpectedEnd {
                expected: n,
                actual,
            });
        }
        let (head, tail) = self.split_at(n);
        *self = tail;
        Ok(head.to_vec())
    }
}

/// Wraps a `std::io::Read` so every read is all-or-nothing.
#[derive(Debug)]
pub struct ExactReader<R> {
    inner: R,
}

impl<R: Read> ExactReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ExactReader<R> {
    fn fill_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(PackStreamError::UnexpectedEnd {
                        expected: buf.len(),
                        actual: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(PackStreamError::Io(e)),
            }
        }
        Ok(())
    }
}

/// Wraps a `std::io::Write` so every write is all-or-nothing.
#[derive(Debug)]
pub struct ExactWriter<W> {
    inner: W,
}

impl<W: Write> ExactWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for ExactWriter<W> {
    fn put_exact(&mut self, bytes: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < bytes.len() {
            match self.inner.write(&bytes[written..]) {
                Ok(0) => {
                    return Err(PackStreamError::UnexpectedEnd {
                        expected: bytes.len(),
                        actual: written,
                    })
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(PackStreamError::Io(e)),
            }
        }
        Ok(())
    }
}
