// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Compact binary encoder and decoder.
//!
//! Fields are written back to back with no names on the wire; the field key
//! only labels errors.

use bytes::Bytes;
use ualink_core::{BinaryReader, BinaryWriter};

use crate::error::CodecError;

// =============================================================================
// BinaryEncoder
// =============================================================================

/// Writes fields in OPC UA binary encoding.
#[derive(Debug, Clone, Default)]
pub struct BinaryEncoder {
    writer: BinaryWriter,
}

impl BinaryEncoder {
    /// Creates an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a signed 32-bit integer.
    #[inline]
    pub fn write_i32(&mut self, _field: &str, value: i32) {
        self.writer.write_i32(value);
    }

    /// Writes a length-prefixed string, or the null marker.
    #[inline]
    pub fn write_string_token(&mut self, _field: &str, value: Option<&str>) {
        self.writer.write_string(value);
    }

    /// Returns the bytes written so far.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.writer.as_slice()
    }

    /// Consumes the encoder and returns the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        self.writer.into_bytes()
    }
}

// =============================================================================
// BinaryDecoder
// =============================================================================

/// Reads fields in OPC UA binary encoding from a borrowed buffer.
#[derive(Debug, Clone)]
pub struct BinaryDecoder<'a> {
    reader: BinaryReader<'a>,
}

impl<'a> BinaryDecoder<'a> {
    /// Creates a decoder over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(buf),
        }
    }

    /// Reads a signed 32-bit integer.
    pub fn read_i32(&mut self, field: &str) -> Result<i32, CodecError> {
        self.reader
            .read_i32()
            .map_err(|e| CodecError::binary(field, e))
    }

    /// Reads a length-prefixed string; the null marker yields `None`.
    pub fn read_string_token(&mut self, field: &str) -> Result<Option<String>, CodecError> {
        self.reader
            .read_string()
            .map_err(|e| CodecError::binary(field, e))
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ualink_core::WireError;

    #[test]
    fn test_fields_are_sequential() {
        let mut encoder = BinaryEncoder::new();
        encoder.write_i32("State", 4);
        encoder.write_string_token("Name", Some("ok"));
        assert_eq!(encoder.as_slice(), &[4, 0, 0, 0, 2, 0, 0, 0, b'o', b'k']);

        let bytes = encoder.into_bytes();
        let mut decoder = BinaryDecoder::new(&bytes);
        assert_eq!(decoder.read_i32("State").unwrap(), 4);
        assert_eq!(decoder.read_string_token("Name").unwrap().as_deref(), Some("ok"));
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_names_field() {
        let mut decoder = BinaryDecoder::new(&[1, 0]);
        let error = decoder.read_i32("State").unwrap_err();
        assert_eq!(
            error,
            CodecError::binary("State", WireError::unexpected_eof(4, 2))
        );
    }
}
