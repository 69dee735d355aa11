// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `probe`: Check one endpoint
//! - `scan`: Sweep addresses and port ranges
//! - `encode` / `decode`: Run the enumerated value codec
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod codec;
mod probe;
mod scan;
mod validate;
mod version;

use std::path::Path;

pub use codec::{decode, decode_value, encode, encode_value};
pub use probe::{parse_endpoint, probe};
pub use scan::scan;
pub use validate::validate;
pub use version::version;

use ualink_config::{ConfigFormat, ConfigLoader, UalinkConfig};

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ualink.yaml";

/// Executes the command selected on the command line.
pub async fn execute(cli: &Cli, config: UalinkConfig) -> BinResult<()> {
    match cli.command.clone() {
        Commands::Probe(args) => probe::probe(&config, args).await,
        Commands::Scan(args) => scan::scan(&config, args).await,
        Commands::Encode(args) => codec::encode(&config, args),
        Commands::Decode(args) => codec::decode(&config, args),
        Commands::Validate(args) => validate::validate(cli, &config, args),
        Commands::Version => version::version(),
    }
}

/// Loads the configuration named by `--config`.
///
/// Without `--config`, reads `ualink.yaml` when it exists and otherwise
/// starts from defaults with environment overrides applied.
pub fn load_config(cli: &Cli) -> BinResult<UalinkConfig> {
    let loader = ConfigLoader::new();
    let config = match &cli.config {
        Some(path) => loader.load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => loader.load(DEFAULT_CONFIG_FILE)?,
        None => loader.load_from_str("{}", ConfigFormat::Json)?,
    };
    Ok(config)
}
