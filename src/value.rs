//! Value codec: how individual items are laid out inside a header's payload.
//!
//! Two families exist.  A fixed-width value is the raw in-memory byte image
//! of its type — host-native byte order and width, no normalization — so a
//! container is portable only between hosts sharing that representation.
//! A text value is an 8-byte length prefix followed by that many content
//! bytes.  The codec is stateless; cursors drive it one value at a time.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::mem;

/// Storage capability of a value type, fixed when a cursor is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Raw byte image of constant width.
    Fixed(u64),
    /// 8-byte length prefix followed by the content bytes.
    Text,
}

/// A type that can be stored in a header.
///
/// The trait bound on cursor constructors is what rejects unsupported types:
/// a type without an impl cannot obtain a cursor at all.
pub trait HeaderValue: Sized {
    fn kind() -> ValueKind;

    /// Encode `self`, returning the number of bytes written.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<u64>;

    /// Decode one value, returning it and the number of bytes consumed.
    fn decode<R: Read>(reader: &mut R) -> io::Result<(Self, u64)>;
}

macro_rules! fixed_value {
    ($t:ty, $write:ident, $read:ident) => {
        impl HeaderValue for $t {
            fn kind() -> ValueKind {
                ValueKind::Fixed(mem::size_of::<$t>() as u64)
            }
            fn encode<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
                writer.$write::<NativeEndian>(*self)?;
                Ok(mem::size_of::<$t>() as u64)
            }
            fn decode<R: Read>(reader: &mut R) -> io::Result<(Self, u64)> {
                Ok((reader.$read::<NativeEndian>()?, mem::size_of::<$t>() as u64))
            }
        }
    };
}

// Single-byte values have no endianness parameter.
macro_rules! byte_value {
    ($t:ty, $write:ident, $read:ident) => {
        impl HeaderValue for $t {
            fn kind() -> ValueKind {
                ValueKind::Fixed(1)
            }
            fn encode<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
                writer.$write(*self)?;
                Ok(1)
            }
            fn decode<R: Read>(reader: &mut R) -> io::Result<(Self, u64)> {
                Ok((reader.$read()?, 1))
            }
        }
    };
}

byte_value!(u8, write_u8, read_u8);
byte_value!(i8, write_i8, read_i8);
fixed_value!(u16, write_u16, read_u16);
fixed_value!(i16, write_i16, read_i16);
fixed_value!(u32, write_u32, read_u32);
fixed_value!(i32, write_i32, read_i32);
fixed_value!(u64, write_u64, read_u64);
fixed_value!(i64, write_i64, read_i64);
fixed_value!(f32, write_f32, read_f32);
fixed_value!(f64, write_f64, read_f64);

impl HeaderValue for String {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        let len = self.len() as u64;
        writer.write_u64::<NativeEndian>(len)?;
        writer.write_all(self.as_bytes())?;
        Ok(8 + len)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<(Self, u64)> {
        let len = reader.read_u64::<NativeEndian>()?;
        let mut content = vec![0u8; len as usize];
        reader.read_exact(&mut content)?;
        let text = String::from_utf8(content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok((text, 8 + len))
    }
}
