// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualink-core
//!
//! Shared building blocks for the ualink OPC UA client core.
//!
//! This crate holds the byte-level primitives every other ualink crate
//! builds on:
//!
//! - **Wire**: little-endian fixed-width integers and length-prefixed
//!   byte/text strings (`BinaryReader`, `BinaryWriter`)
//! - **Error**: `WireError` for malformed or truncated input
//!
//! ## Example
//!
//! ```
//! use ualink_core::wire::{BinaryReader, BinaryWriter};
//!
//! let mut writer = BinaryWriter::new();
//! writer.write_u32(0);
//! writer.write_string(Some("opc.tcp://localhost:4840"));
//!
//! let bytes = writer.into_bytes();
//! let mut reader = BinaryReader::new(&bytes);
//! assert_eq!(reader.read_u32().unwrap(), 0);
//! assert_eq!(
//!     reader.read_string().unwrap().as_deref(),
//!     Some("opc.tcp://localhost:4840")
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{WireError, WireResult};
pub use wire::{BinaryReader, BinaryWriter, MAX_STRING_LENGTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
