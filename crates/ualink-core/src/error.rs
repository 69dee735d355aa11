// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for wire-level encoding and decoding.
//!
//! Wire errors are raised only by the primitives in [`crate::wire`] when the
//! input is truncated or carries a length prefix that cannot be honoured.
//!
//! # Examples
//!
//! ```
//! use ualink_core::error::WireError;
//!
//! let error = WireError::unexpected_eof(4, 1);
//! assert_eq!(error.to_string(), "Unexpected end of input: needed 4 bytes, 1 remaining");
//! assert_eq!(error.error_type(), "unexpected_eof");
//! ```

use thiserror::Error;

/// Result type alias for wire operations.
pub type WireResult<T> = Result<T, WireError>;

// =============================================================================
// WireError
// =============================================================================

/// Errors raised while reading or writing wire primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The input ended before the requested value could be read.
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes left in the input.
        remaining: usize,
    },

    /// A length prefix was negative (other than the null marker) or too large.
    #[error("Invalid length prefix {length} (maximum {max})")]
    InvalidLength {
        /// The decoded length prefix.
        length: i64,
        /// The maximum accepted length.
        max: usize,
    },

    /// A text string did not contain valid UTF-8.
    #[error("Invalid UTF-8 in string: {message}")]
    InvalidUtf8 {
        /// Decoder message.
        message: String,
    },
}

impl WireError {
    /// Creates an unexpected end-of-input error.
    #[inline]
    pub fn unexpected_eof(needed: usize, remaining: usize) -> Self {
        Self::UnexpectedEof { needed, remaining }
    }

    /// Creates an invalid length error.
    #[inline]
    pub fn invalid_length(length: i64, max: usize) -> Self {
        Self::InvalidLength { length, max }
    }

    /// Creates an invalid UTF-8 error.
    pub fn invalid_utf8(message: impl Into<String>) -> Self {
        Self::InvalidUtf8 {
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::UnexpectedEof { .. } => "unexpected_eof",
            Self::InvalidLength { .. } => "invalid_length",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
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
    fn test_error_messages() {
        assert_eq!(
            WireError::invalid_length(-5, 1024).to_string(),
            "Invalid length prefix -5 (maximum 1024)"
        );
        assert_eq!(
            WireError::invalid_utf8("bad byte").to_string(),
            "Invalid UTF-8 in string: bad byte"
        );
    }

    #[test]
    fn test_error_type() {
        assert_eq!(WireError::unexpected_eof(1, 0).error_type(), "unexpected_eof");
        assert_eq!(WireError::invalid_length(1, 0).error_type(), "invalid_length");
        assert_eq!(WireError::invalid_utf8("x").error_type(), "invalid_utf8");
    }
}
