// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Little-endian wire primitives.
//!
//! OPC UA binary encoding writes every integer little-endian and prefixes
//! byte strings and text strings with a signed 32-bit length, where `-1`
//! marks a null value.
//!
//! ```text
//! +----------------+---------------------+
//! | Length (i32 LE)| Payload (Length B)  |
//! +----------------+---------------------+
//!   -1 => null, 0 => empty
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{WireError, WireResult};

/// Largest byte/text string accepted by [`BinaryReader`] by default.
pub const MAX_STRING_LENGTH: usize = 65535;

/// Length prefix marking a null string.
const NULL_LENGTH: i32 = -1;

// =============================================================================
// BinaryWriter
// =============================================================================

/// Growable buffer writing little-endian wire primitives.
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Writes an unsigned 32-bit integer.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Writes a signed 32-bit integer.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    /// Writes raw bytes without a length prefix.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Writes a length-prefixed byte string; `None` writes the null marker.
    pub fn write_byte_string(&mut self, value: Option<&[u8]>) {
        match value {
            Some(bytes) => {
                // Lengths beyond i32 cannot be represented on the wire.
                let length = i32::try_from(bytes.len()).unwrap_or(i32::MAX);
                self.write_i32(length);
                self.write_raw(&bytes[..length as usize]);
            }
            None => self.write_i32(NULL_LENGTH),
        }
    }

    /// Writes a length-prefixed UTF-8 string; `None` writes the null marker.
    pub fn write_string(&mut self, value: Option<&str>) {
        self.write_byte_string(value.map(str::as_bytes));
    }

    /// Overwrites four bytes at `offset` with `value`.
    ///
    /// Used to back-fill message length fields once the body is known.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the written length.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the written bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and returns the frozen bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

// =============================================================================
// BinaryReader
// =============================================================================

/// Cursor reading little-endian wire primitives from a byte slice.
///
/// Every read checks the remaining length first, so truncated input yields
/// [`WireError::UnexpectedEof`] instead of a panic.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    buf: &'a [u8],
    position: usize,
    max_string_length: usize,
}

impl<'a> BinaryReader<'a> {
    /// Creates a reader over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            position: 0,
            max_string_length: MAX_STRING_LENGTH,
        }
    }

    /// Sets the largest byte/text string the reader accepts.
    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = max;
        self
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Returns the number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    fn ensure(&self, needed: usize) -> WireResult<()> {
        if self.buf.remaining() < needed {
            return Err(WireError::unexpected_eof(needed, self.buf.remaining()));
        }
        Ok(())
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> WireResult<u8> {
        self.ensure(1)?;
        self.position += 1;
        Ok(self.buf.get_u8())
    }

    /// Reads an unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> WireResult<u32> {
        self.ensure(4)?;
        self.position += 4;
        Ok(self.buf.get_u32_le())
    }

    /// Reads a signed 32-bit integer.
    pub fn read_i32(&mut self) -> WireResult<i32> {
        self.ensure(4)?;
        self.position += 4;
        Ok(self.buf.get_i32_le())
    }

    /// Reads `len` raw bytes.
    pub fn read_raw(&mut self, len: usize) -> WireResult<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        self.position += len;
        Ok(head)
    }

    /// Reads a length-prefixed byte string; the null marker yields `None`.
    pub fn read_byte_string(&mut self) -> WireResult<Option<&'a [u8]>> {
        let length = self.read_i32()?;
        if length == NULL_LENGTH {
            return Ok(None);
        }
        if length < 0 || length as usize > self.max_string_length {
            return Err(WireError::invalid_length(
                i64::from(length),
                self.max_string_length,
            ));
        }
        self.read_raw(length as usize).map(Some)
    }

    /// Reads a length-prefixed UTF-8 string; the null marker yields `None`.
    pub fn read_string(&mut self) -> WireResult<Option<String>> {
        match self.read_byte_string()? {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(|s| Some(s.to_string()))
                .map_err(|e| WireError::invalid_utf8(e.to_string())),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_little_endian() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0102_0304);
        writer.write_i32(-2);
        writer.write_u8(0xAB);
        assert_eq!(
            writer.as_slice(),
            &[0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF, 0xAB]
        );

        let mut reader = BinaryReader::new(writer.as_slice());
        assert_eq!(reader.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.position(), 9);
    }

    #[test]
    fn test_string_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_string(Some("abc"));
        assert_eq!(writer.as_slice(), &[3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_null_and_empty_strings() {
        let mut writer = BinaryWriter::new();
        writer.write_string(None);
        writer.write_string(Some(""));
        assert_eq!(writer.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);

        let mut reader = BinaryReader::new(writer.as_slice());
        assert_eq!(reader.read_string().unwrap(), None);
        assert_eq!(reader.read_string().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = BinaryReader::new(&[1, 2]);
        assert_eq!(reader.read_u32(), Err(WireError::unexpected_eof(4, 2)));
        // A failed read consumes nothing.
        assert_eq!(reader.remaining(), 2);

        let mut reader = BinaryReader::new(&[10, 0, 0, 0, b'x']);
        assert_eq!(
            reader.read_byte_string(),
            Err(WireError::unexpected_eof(10, 1))
        );
    }

    #[test]
    fn test_length_limits() {
        let mut reader = BinaryReader::new(&[0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            reader.read_byte_string(),
            Err(WireError::invalid_length(-2, MAX_STRING_LENGTH))
        );

        let mut writer = BinaryWriter::new();
        writer.write_string(Some("too long"));
        let mut reader = BinaryReader::new(writer.as_slice()).with_max_string_length(4);
        assert!(matches!(
            reader.read_string(),
            Err(WireError::InvalidLength { length: 8, max: 4 })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut reader = BinaryReader::new(&[2, 0, 0, 0, 0xC3, 0x28]);
        assert!(matches!(reader.read_string(), Err(WireError::InvalidUtf8 { .. })));
    }

    #[test]
    fn test_patch_u32() {
        let mut writer = BinaryWriter::with_capacity(8);
        writer.write_raw(b"HELF");
        writer.write_u32(0);
        writer.patch_u32(4, 32);
        assert_eq!(writer.as_slice(), b"HELF\x20\x00\x00\x00");
        assert_eq!(writer.len(), 8);
        assert!(!writer.is_empty());
    }
}
