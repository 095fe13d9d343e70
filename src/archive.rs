//! Bounded little-endian cursor over one raw blob.
//!
//! Every sub-codec derives a fresh [`Reader`] scoped to exactly the bytes of
//! the blob it is decoding and a fresh [`Writer`] for the bytes it emits.
//! The primitives mirror the engine's archive layer: fixed-width integers,
//! length-prefixed strings (UTF-8 or UTF-16, null-terminated), 128-bit guids
//! in the engine's shuffled byte order, and count-prefixed arrays.

use byteorder::{ByteOrder, WriteBytesExt, LE};
use std::io::Write;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected end of data: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("invalid string payload: {0}")]
    InvalidString(String),
    #[error("array length {len} exceeds the {remaining} remaining bytes")]
    BadArrayLength { len: u32, remaining: usize },
    #[error("object/value/vector has too many elements")]
    TooManyValues,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The engine stores guids as four little-endian 32-bit words. Reversing each
/// 4-byte block maps them to RFC 4122 order; the permutation is an involution,
/// so the same shuffle serves both directions.
fn shuffle_guid(b: [u8; 16]) -> [u8; 16] {
    [
        b[3], b[2], b[1], b[0], b[7], b[6], b[5], b[4], b[11], b[10], b[9], b[8], b[15], b[14],
        b[13], b[12],
    ]
}

/// Sequential reader scoped to an exact byte window.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::UnexpectedEof {
                needed: n - self.remaining(),
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(LE::read_u32(self.take(4)?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(LE::read_i32(self.take(4)?))
    }

    pub fn i64(&mut self) -> Result<i64> {
        Ok(LE::read_i64(self.take(8)?))
    }

    pub fn f32(&mut self) -> Result<f32> {
        Ok(LE::read_f32(self.take(4)?))
    }

    pub fn guid(&mut self) -> Result<Uuid> {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(self.take(16)?);
        Ok(Uuid::from_bytes(shuffle_guid(raw)))
    }

    /// Length-prefixed string. A positive prefix counts UTF-8 bytes including
    /// the null terminator; a negative prefix counts UTF-16 code units
    /// including the terminator; zero is the empty string.
    pub fn fstring(&mut self) -> Result<String> {
        let size = self.i32()?;
        if size == 0 {
            return Ok(String::new());
        }
        if size > 0 {
            let raw = self.take(size as usize)?;
            let (body, terminator) = raw.split_at(raw.len() - 1);
            if terminator[0] != 0 {
                return Err(Error::InvalidString("missing UTF-8 terminator".into()));
            }
            return std::str::from_utf8(body)
                .map(str::to_owned)
                .map_err(|e| Error::InvalidString(e.to_string()));
        }
        let count = size.unsigned_abs() as usize;
        if count > self.remaining() {
            return Err(Error::UnexpectedEof {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let raw = self.take(count * 2)?;
        let mut units: Vec<u16> = raw.chunks_exact(2).map(LE::read_u16).collect();
        if units.pop() != Some(0) {
            return Err(Error::InvalidString("missing UTF-16 terminator".into()));
        }
        String::from_utf16(&units).map_err(|e| Error::InvalidString(e.to_string()))
    }

    /// Count-prefixed array. The count is rejected up front when it exceeds
    /// the remaining window, since every element occupies at least one byte.
    pub fn tarray<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let len = self.u32()?;
        if len as usize > self.remaining() {
            return Err(Error::BadArrayLength {
                len,
                remaining: self.remaining(),
            });
        }
        let mut values = Vec::with_capacity(len as usize);
        for _ in 0..len {
            values.push(f(self)?);
        }
        Ok(values)
    }

    pub fn read_to_end(&mut self) -> Vec<u8> {
        let rest = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        rest
    }

    // Availability-aware reads. None means the window is too short; nothing
    // is consumed in that case.

    pub fn try_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        self.u8().ok()
    }

    pub fn try_i32(&mut self) -> Option<i32> {
        if self.remaining() < 4 {
            return None;
        }
        self.i32().ok()
    }

    pub fn try_i64(&mut self) -> Option<i64> {
        if self.remaining() < 8 {
            return None;
        }
        self.i64().ok()
    }

    pub fn try_guid(&mut self) -> Option<Uuid> {
        if self.remaining() < 16 {
            return None;
        }
        self.guid().ok()
    }
}

/// Sequential writer accumulating the re-encoded blob.
#[derive(Default)]
pub struct Writer {
    data: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn u8(&mut self, v: u8) -> Result<()> {
        self.data.write_u8(v)?;
        Ok(())
    }

    pub fn u32(&mut self, v: u32) -> Result<()> {
        self.data.write_u32::<LE>(v)?;
        Ok(())
    }

    pub fn i32(&mut self, v: i32) -> Result<()> {
        self.data.write_i32::<LE>(v)?;
        Ok(())
    }

    pub fn i64(&mut self, v: i64) -> Result<()> {
        self.data.write_i64::<LE>(v)?;
        Ok(())
    }

    pub fn f32(&mut self, v: f32) -> Result<()> {
        self.data.write_f32::<LE>(v)?;
        Ok(())
    }

    pub fn guid(&mut self, id: &Uuid) -> Result<()> {
        self.data.write_all(&shuffle_guid(*id.as_bytes()))?;
        Ok(())
    }

    /// Mirror of [`Reader::fstring`]. ASCII strings are written as UTF-8 with
    /// a positive prefix, anything else as UTF-16 with a negative prefix,
    /// matching what the engine itself emits.
    pub fn fstring(&mut self, s: &str) -> Result<()> {
        if s.is_empty() {
            return self.i32(0);
        }
        if s.is_ascii() {
            let bytes = s.as_bytes();
            let size = i32::try_from(bytes.len() + 1).map_err(|_| Error::TooManyValues)?;
            self.i32(size)?;
            self.data.write_all(bytes)?;
            self.u8(0)?;
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            let count = i32::try_from(units.len() + 1).map_err(|_| Error::TooManyValues)?;
            self.i32(-count)?;
            for unit in units {
                self.data.write_u16::<LE>(unit)?;
            }
            self.data.write_u16::<LE>(0)?;
        }
        Ok(())
    }

    pub fn tarray<T>(
        &mut self,
        items: &[T],
        mut f: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        let len = u32::try_from(items.len()).map_err(|_| Error::TooManyValues)?;
        self.u32(len)?;
        for item in items {
            f(self, item)?;
        }
        Ok(())
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.write_all(bytes)?;
        Ok(())
    }
}
