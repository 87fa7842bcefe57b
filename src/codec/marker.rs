//! Marker byte table and size-class selection.
//!
//! Every encoded value starts with one marker byte:
//!
//! ```text
//! 0x00..=0x7F  tiny int 0..=127          0xC0  null
//! 0xF0..=0xFF  tiny int -16..=-1         0xC2  false / 0xC3 true
//! 0x80..=0x8F  text, length in low nibble 0xC8..=0xCB int 8/16/32/64
//! 0xA0..=0xAF  map, size in low nibble    0xD0..=0xD2 text, 8/16/32-bit length
//!                                         0xD8..=0xDA map, 8/16/32-bit size
//! ```
//!
//! All multi-byte integers, lengths and sizes are Big Endian.

use crate::error::{PackStreamError, Result};

pub const NULL: u8 = 0xC0;
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

pub const TINY_TEXT: u8 = 0x80;
pub const TEXT_8: u8 = 0xD0;
pub const TEXT_16: u8 = 0xD1;
pub const TEXT_32: u8 = 0xD2;

pub const TINY_MAP: u8 = 0xA0;
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

/// Smallest integer carried in the marker byte itself.
pub const TINY_INT_MIN: i64 = -16;
/// Largest integer carried in the marker byte itself.
pub const TINY_INT_MAX: i64 = 127;

/// Largest length/size carried in the low nibble of a tiny text/map marker.
pub const TINY_SIZE_MAX: usize = 0x0F;

/// Largest length/size a sized marker can declare.
pub const MAX_SIZE: u32 = u32::MAX;

/// Byte width of a fixed-size integer payload or size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    One,
    Two,
    Four,
    Eight,
}

impl Width {
    /// Number of bytes this width occupies on the wire.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
            Width::Four => 4,
            Width::Eight => 8,
        }
    }
}

/// How a text length or map size is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// In the low nibble of the marker.
    Inline(u8),
    /// In an unsigned field of the given width following the marker.
    Prefixed(Width),
}

/// A classified marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Null,
    Boolean(bool),
    TinyInt(i8),
    Int(Width),
    Text(Size),
    Map(Size),
}

impl Marker {
    /// Classify a marker byte, or `None` if it is not in the table.
    pub fn from_byte(byte: u8) -> Option<Marker> {
        let signed = byte as i8;
        if (TINY_INT_MIN..=TINY_INT_MAX).contains(&i64::from(signed)) {
            return Some(Marker::TinyInt(signed));
        }

        let marker = match byte {
            NULL => Marker::Null,
            FALSE => Marker::Boolean(false),
            TRUE => Marker::Boolean(true),
            INT_8 => Marker::Int(Width::One),
            INT_16 => Marker::Int(Width::Two),
            INT_32 => Marker::Int(Width::Four),
            INT_64 => Marker::Int(Width::Eight),
            0x80..=0x8F => Marker::Text(Size::Inline(byte & 0x0F)),
            TEXT_8 => Marker::Text(Size::Prefixed(Width::One)),
            TEXT_16 => Marker::Text(Size::Prefixed(Width::Two)),
            TEXT_32 => Marker::Text(Size::Prefixed(Width::Four)),
            0xA0..=0xAF => Marker::Map(Size::Inline(byte & 0x0F)),
            MAP_8 => Marker::Map(Size::Prefixed(Width::One)),
            MAP_16 => Marker::Map(Size::Prefixed(Width::Two)),
            MAP_32 => Marker::Map(Size::Prefixed(Width::Four)),
            _ => return None,
        };
        Some(marker)
    }
}

/// Marker set for one variable-length variant.
#[derive(Debug, Clone, Copy)]
pub struct SizedFamily {
    pub name: &'static str,
    pub tiny: u8,
    pub size_8: u8,
    pub size_16: u8,
    pub size_32: u8,
}

pub const TEXT: SizedFamily = SizedFamily {
    name: "Text",
    tiny: TINY_TEXT,
    size_8: TEXT_8,
    size_16: TEXT_16,
    size_32: TEXT_32,
};

pub const MAP: SizedFamily = SizedFamily {
    name: "Map",
    tiny: TINY_MAP,
    size_8: MAP_8,
    size_16: MAP_16,
    size_32: MAP_32,
};

/// Marker plus size field, at most 5 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHeader {
    buf: [u8; 5],
    len: usize,
}

impl SizeHeader {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl SizedFamily {
    /// Build the smallest header that declares `size`.
    ///
    /// # Errors
    ///
    /// `SizeOverflow` if `size` does not fit in 32 bits.
    pub fn header(&self, size: usize) -> Result<SizeHeader> {
        let mut buf = [0u8; 5];
        let len = if size <= TINY_SIZE_MAX {
            buf[0] = self.tiny | size as u8;
            1
        } else if let Ok(n) = u8::try_from(size) {
            buf[0] = self.size_8;
            buf[1] = n;
            2
        } else if let Ok(n) = u16::try_from(size) {
            buf[0] = self.size_16;
            buf[1..3].copy_from_slice(&n.to_be_bytes());
            3
        } else if let Ok(n) = u32::try_from(size) {
            buf[0] = self.size_32;
            buf[1..5].copy_from_slice(&n.to_be_bytes());
            5
        } else {
            return Err(PackStreamError::SizeOverflow {
                kind: self.name,
                size,
                max: MAX_SIZE,
            });
        };
        Ok(SizeHeader { buf, len })
    }
}

/// Marker plus big-endian payload for an integer, at most 9 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntHeader {
    buf: [u8; 9],
    len: usize,
}

impl IntHeader {
    /// Pick the smallest integer form that holds `i`.
    pub fn for_value(i: i64) -> Self {
        let mut buf = [0u8; 9];
        let len = if (TINY_INT_MIN..=TINY_INT_MAX).contains(&i) {
            buf[0] = i as i8 as u8;
            1
        } else if let Ok(n) = i8::try_from(i) {
            buf[0] = INT_8;
            buf[1..2].copy_from_slice(&n.to_be_bytes());
            2
        } else if let Ok(n) = i16::try_from(i) {
            buf[0] = INT_16;
            buf[1..3].copy_from_slice(&n.to_be_bytes());
            3
        } else if let Ok(n) = i32::try_from(i) {
            buf[0] = INT_32;
            buf[1..5].copy_from_slice(&n.to_be_bytes());
            5
        } else {
            buf[0] = INT_64;
            buf[1..9].copy_from_slice(&i.to_be_bytes());
            9
        };
        Self { buf, len }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
