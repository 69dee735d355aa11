// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `probe`: Check whether one endpoint is an OPC UA server
//! - `scan`: Sweep addresses and port ranges for OPC UA servers
//! - `encode`: Encode an enumerated value
//! - `decode`: Decode an enumerated value
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// ualink - OPC UA endpoint discovery and value coding
#[derive(Parser, Debug)]
#[command(
    name = "ualink",
    author = "Sylvex <contact@sylvex.io>",
    version = ualink_opcua::VERSION,
    about = "OPC UA endpoint discovery and enumerated value coding",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path (default: ualink.yaml if present)
    #[arg(short, long, env = "UALINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the ualink CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check whether an endpoint is an OPC UA server
    ///
    /// Sends a transport Hello and waits for a valid Acknowledge. No secure
    /// channel or session is opened.
    Probe(ProbeArgs),

    /// Sweep addresses and port ranges for OPC UA servers
    Scan(ScanArgs),

    /// Encode an enumerated value with a configured type description
    Encode(EncodeArgs),

    /// Decode an enumerated value with a configured type description
    Decode(DecodeArgs),

    /// Validate the configuration file
    ///
    /// Parses the configuration, applies environment overrides and loads every
    /// type description file.
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `probe` command.
#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Endpoint as host, host:port or opc.tcp://host:port
    pub endpoint: String,

    /// Timeout of each probe step in milliseconds (default: from config)
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `scan` command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Hosts or addresses to sweep (default: scanner.addresses from config)
    pub addresses: Vec<String>,

    /// Port ranges, e.g. "4840-4841;50000" (default: scanner.ports from config)
    #[arg(short, long, conflicts_with = "preset")]
    pub ports: Option<String>,

    /// Use a predefined port set instead of --ports
    #[arg(long)]
    pub preset: Option<PortPreset>,

    /// Largest number of probes running at once
    #[arg(short, long)]
    pub max_probes: Option<usize>,

    /// Timeout of each probe step in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `encode` command.
#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Type id (e.g. "ns=2;i=3063") or alias
    #[arg(short = 't', long = "type")]
    pub type_key: String,

    /// Field name or integer code (default: the type's first field)
    #[arg(long)]
    pub value: Option<String>,

    /// Name of the encoded field
    #[arg(long, default_value = "Value")]
    pub field: String,

    /// Target encoding (default: json or json-nr per codec.reversible)
    #[arg(short, long)]
    pub encoding: Option<Encoding>,
}

/// Arguments for the `decode` command.
#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Type id (e.g. "ns=2;i=3063") or alias
    #[arg(short = 't', long = "type")]
    pub type_key: String,

    /// Hex bytes for binary, a JSON object or a bare JSON token otherwise
    pub input: String,

    /// Name of the decoded field
    #[arg(long, default_value = "Value")]
    pub field: String,

    /// Source encoding (default: json or json-nr per codec.reversible)
    #[arg(short, long)]
    pub encoding: Option<Encoding>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
    /// Text with file, line and thread details
    Full,
}

impl From<ualink_config::LogFormat> for LogFormat {
    fn from(format: ualink_config::LogFormat) -> Self {
        match format {
            ualink_config::LogFormat::Pretty => LogFormat::Text,
            ualink_config::LogFormat::Compact => LogFormat::Compact,
            ualink_config::LogFormat::Full => LogFormat::Full,
            ualink_config::LogFormat::Json => LogFormat::Json,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

/// Value encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// OPC UA binary, shown as hex
    Binary,
    /// Reversible JSON
    Json,
    /// Non-reversible JSON
    #[value(name = "json-nr")]
    JsonNr,
}

impl Encoding {
    /// Returns the JSON encoding matching `reversible`.
    pub fn json(reversible: bool) -> Self {
        if reversible {
            Encoding::Json
        } else {
            Encoding::JsonNr
        }
    }
}

/// Predefined port sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PortPreset {
    /// 4840-4841
    OpcUa,
    /// Ports commonly used by OPC UA server products
    WellKnown,
    /// Every port
    All,
}

impl PortPreset {
    /// Returns the port ranges of the preset.
    pub fn ranges(self) -> Vec<ualink_opcua::PortRange> {
        match self {
            PortPreset::OpcUa => ualink_opcua::PortRange::opc_ua(),
            PortPreset::WellKnown => ualink_opcua::PortRange::well_known(),
            PortPreset::All => ualink_opcua::PortRange::all(),
        }
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the log level, letting `--quiet` and `--verbose` win over
    /// `--log-level` and the configured level.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// Returns the log format, preferring `--log-format` over configuration.
    pub fn effective_log_format(&self, configured: ualink_config::LogFormat) -> LogFormat {
        self.log_format.unwrap_or_else(|| configured.into())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_command() {
        let cli = Cli::parse_from(["ualink", "probe", "opc.tcp://plc:4840", "-t", "500"]);
        if let Commands::Probe(args) = cli.command {
            assert_eq!(args.endpoint, "opc.tcp://plc:4840");
            assert_eq!(args.timeout_ms, Some(500));
            assert_eq!(args.format, OutputFormat::Text);
        } else {
            panic!("Expected Probe command");
        }
    }

    #[test]
    fn test_scan_command() {
        let cli = Cli::parse_from([
            "ualink", "scan", "10.0.0.1", "10.0.0.2", "-p", "4840;50000", "-m", "8",
        ]);
        if let Commands::Scan(args) = cli.command {
            assert_eq!(args.addresses, vec!["10.0.0.1", "10.0.0.2"]);
            assert_eq!(args.ports.as_deref(), Some("4840;50000"));
            assert_eq!(args.max_probes, Some(8));
        } else {
            panic!("Expected Scan command");
        }
    }

    #[test]
    fn test_scan_preset_conflicts_with_ports() {
        assert!(Cli::try_parse_from(["ualink", "scan", "--preset", "well-known", "-p", "1"]).is_err());
        let cli = Cli::parse_from(["ualink", "scan", "--preset", "well-known"]);
        if let Commands::Scan(args) = cli.command {
            assert_eq!(args.preset, Some(PortPreset::WellKnown));
        } else {
            panic!("Expected Scan command");
        }
    }

    #[test]
    fn test_codec_commands() {
        let cli = Cli::parse_from([
            "ualink", "encode", "-t", "MachineState", "--value", "Running", "-e", "json-nr",
        ]);
        if let Commands::Encode(args) = cli.command {
            assert_eq!(args.type_key, "MachineState");
            assert_eq!(args.value.as_deref(), Some("Running"));
            assert_eq!(args.encoding, Some(Encoding::JsonNr));
            assert_eq!(args.field, "Value");
        } else {
            panic!("Expected Encode command");
        }

        let cli = Cli::parse_from(["ualink", "decode", "-t", "i=852", "01000000", "-e", "binary"]);
        assert!(matches!(cli.command, Commands::Decode(ref a) if a.input == "01000000"));
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["ualink", "-c", "/etc/ualink/ualink.yaml", "version"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ualink/ualink.yaml")));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(["ualink", "version"]);
        assert_eq!(cli.effective_log_level("info"), "info");

        let cli = Cli::parse_from(["ualink", "-l", "trace", "version"]);
        assert_eq!(cli.effective_log_level("info"), "trace");

        let cli = Cli::parse_from(["ualink", "-q", "-l", "trace", "version"]);
        assert_eq!(cli.effective_log_level("info"), "warn");

        let cli = Cli::parse_from(["ualink", "-v", "version"]);
        assert_eq!(cli.effective_log_level("info"), "debug");
    }

    #[test]
    fn test_log_format() {
        let cli = Cli::parse_from(["ualink", "version"]);
        assert_eq!(cli.effective_log_format(ualink_config::LogFormat::Json), LogFormat::Json);

        let cli = Cli::parse_from(["ualink", "--log-format", "compact", "version"]);
        assert_eq!(cli.effective_log_format(ualink_config::LogFormat::Json), LogFormat::Compact);
    }
}
