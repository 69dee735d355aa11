// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualink-config
//!
//! Configuration management for ualink.
//!
//! ## Features
//!
//! - **Schema**: scanner, codec and logging sections with defaults and
//!   validation
//! - **Multi-Format Support**: YAML, TOML and JSON documents
//! - **Environment Overrides**: `UALINK_*` variables and `${VAR:default}`
//!   placeholders
//! - **Type Descriptions**: inline or in separate JSON/YAML files, loaded into
//!   a shared registry
//!
//! ## Quick Start
//!
//! ```no_run
//! use ualink_config::loader::load_config;
//!
//! let config = load_config("ualink.yaml").unwrap();
//! let registry = config.codec.registry().unwrap();
//! println!("{} type descriptions", registry.len());
//! ```
//!
//! ## Example Document
//!
//! ```yaml
//! scanner:
//!   addresses: ["192.168.1.10"]
//!   ports: "4840-4841;${EXTRA_PORT:50000}"
//!   max_probes: 64
//!   probe_timeout_ms: 2000
//! codec:
//!   reversible: true
//!   types:
//!     - type_id: "ns=2;i=3063"
//!       alias: MachineState
//!       fields:
//!         - { name: Idle, code: 0 }
//!         - { name: Running, code: 1 }
//!   type_files: ["types/companion.json"]
//! logging:
//!   level: info
//!   format: compact
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{
    CodecSection, LogFormat, LogLevel, LoggingConfig, ScannerSection, UalinkConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
