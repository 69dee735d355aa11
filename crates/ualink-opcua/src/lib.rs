// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualink-opcua
//!
//! OPC UA client protocol core for ualink.
//!
//! ## Features
//!
//! - **Endpoint discovery**: Hello/Acknowledge handshake probe and concurrent
//!   port sweeps, without opening a secure channel
//! - **Type metadata**: `NodeId`, enumerated type descriptions and a shared
//!   registry
//! - **Value codec**: enumerated values in binary, reversible JSON and
//!   non-reversible JSON encoding
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       ualink-opcua                       │
//! ├───────────────────────────┬──────────────────────────────┤
//! │          probe            │            codec             │
//! │  PortScanner              │  encode_enum / decode_enum   │
//! │    └─ ServerProbe         │    ├─ Encoder / Decoder      │
//! │         └─ message        │    └─ TypeRegistry / types   │
//! ├───────────────────────────┴──────────────────────────────┤
//! │               ualink-core (wire primitives)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use ualink_opcua::probe::probe_endpoint;
//!
//! # async fn example() {
//! let addr = "192.168.1.100:4840".parse().unwrap();
//! if probe_endpoint(addr, Duration::from_secs(5)).await {
//!     println!("{addr} speaks OPC UA");
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod codec;
pub mod error;
pub mod probe;
pub mod registry;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use codec::{decode_enum, encode_enum, Decoder, Encoded, Encoder};
pub use error::{
    CodecError, ConfigurationError, ConnectionError, ErrorCode, ErrorSeverity, OpcUaError,
    OpcUaResult, ProbeError,
};
pub use probe::{PortRange, PortScanner, ScanReport, ScannerConfig, ServerProbe};
pub use registry::TypeRegistry;
pub use types::{EnumField, EnumValue, NodeId, NodeIdentifier, TypeDescription};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
