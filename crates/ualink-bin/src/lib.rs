// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ualink-bin
//!
//! Command-line tool for the ualink OPC UA protocol core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  main.rs                    │
//! └──────────────────────┬──────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │   cli.rs    │
//!                 └──────┬──────┘
//!                        │
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!    ┌──────────┐  ┌──────────┐  ┌──────────┐
//!    │ commands │  │  config  │  │ logging  │
//!    └────┬─────┘  └──────────┘  └──────────┘
//!         │
//!  ┌──────┴───────┐
//!  │ ualink-opcua │
//!  └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Is there an OPC UA server on this port?
//! ualink probe opc.tcp://192.168.1.10:4840
//!
//! # Sweep a subnet host list over the usual ports
//! ualink scan 192.168.1.10 192.168.1.11 --preset well-known
//!
//! # Encode and decode an enumerated value from configuration
//! ualink encode -t MachineState --value Running -e binary
//! ualink decode -t MachineState '{"Value": "Running_1"}' -e json-nr
//!
//! # Validate configuration
//! ualink -c ualink.yaml validate
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Loads configuration, initializes logging and runs the selected command.
pub async fn run(cli: Cli) -> BinResult<()> {
    let config = commands::load_config(&cli)?;

    let level = cli.effective_log_level(config.logging.level.as_str());
    init_logging(level, cli.effective_log_format(config.logging.format))?;
    tracing::debug!(version = VERSION, command = ?cli.command, "Starting");

    commands::execute(&cli, config).await
}
