// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for ualink.
//!
//! # Schema Structure
//!
//! ```text
//! UalinkConfig
//! ├── scanner: ScannerSection
//! ├── codec: CodecSection
//! └── logging: LoggingConfig
//! ```
//!
//! Every section has defaults, so an empty document is a valid
//! configuration.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ualink_opcua::probe::DEFAULT_MAX_PROBES;
use ualink_opcua::{PortRange, ScannerConfig, TypeDescription, TypeRegistry};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default probe timeout in milliseconds.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;

/// Largest accepted probe timeout in milliseconds (5 minutes).
pub const MAX_PROBE_TIMEOUT_MS: u64 = 300_000;

/// Default port ranges swept by the scanner.
pub const DEFAULT_PORTS: &str = "4840-4841";

// =============================================================================
// UalinkConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UalinkConfig {
    /// Endpoint scanner settings.
    #[serde(default)]
    pub scanner: ScannerSection,

    /// Value codec settings and type descriptions.
    #[serde(default)]
    pub codec: CodecSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UalinkConfig {
    /// Validates every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.scanner.validate()?;
        self.codec.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

// =============================================================================
// ScannerSection
// =============================================================================

/// Endpoint scanner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSection {
    /// Hosts or addresses swept by `scan` when none are given on the command
    /// line.
    #[serde(default)]
    pub addresses: Vec<String>,

    /// Port range text, e.g. `4840-4841;50000`.
    #[serde(default = "default_ports")]
    pub ports: String,

    /// Largest number of probes running at once.
    #[serde(default = "default_max_probes")]
    pub max_probes: usize,

    /// Timeout of each probe step in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl ScannerSection {
    /// Validates the scanner settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_probes == 0 {
            return Err(ConfigError::validation(
                "scanner.max_probes",
                "must be at least 1",
            ));
        }
        if self.probe_timeout_ms == 0 || self.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS {
            return Err(ConfigError::validation(
                "scanner.probe_timeout_ms",
                format!("must be between 1 and {MAX_PROBE_TIMEOUT_MS}"),
            ));
        }
        if self.addresses.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::validation(
                "scanner.addresses",
                "entries cannot be empty",
            ));
        }
        self.port_ranges()?;
        self.scanner_config().validate()?;
        Ok(())
    }

    /// Returns the probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Parses and merges the port ranges.
    pub fn port_ranges(&self) -> ConfigResult<Vec<PortRange>> {
        Ok(PortRange::parse(&self.ports)?)
    }

    /// Builds the scanner settings.
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig::default()
            .with_max_probes(self.max_probes)
            .with_probe_timeout(self.probe_timeout())
    }
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            addresses: Vec::new(),
            ports: default_ports(),
            max_probes: default_max_probes(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_ports() -> String {
    DEFAULT_PORTS.to_string()
}

fn default_max_probes() -> usize {
    DEFAULT_MAX_PROBES
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

// =============================================================================
// CodecSection
// =============================================================================

/// Value codec settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSection {
    /// Use the reversible JSON form.
    #[serde(default = "default_reversible")]
    pub reversible: bool,

    /// Inline type descriptions.
    #[serde(default)]
    pub types: Vec<TypeDescription>,

    /// Additional JSON or YAML type description documents. Relative paths are
    /// resolved against the configuration file's directory.
    #[serde(default)]
    pub type_files: Vec<PathBuf>,
}

impl CodecSection {
    /// Validates the codec settings.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut type_ids = HashSet::new();
        let mut aliases = HashSet::new();
        for description in &self.types {
            if !type_ids.insert(description.type_id()) {
                return Err(ConfigError::validation(
                    "codec.types",
                    format!("duplicate type id {}", description.type_id()),
                ));
            }
            if let Some(alias) = description.alias() {
                if !aliases.insert(alias) {
                    return Err(ConfigError::validation(
                        "codec.types",
                        format!("duplicate alias {alias}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Builds a registry from the inline descriptions and the type files.
    pub fn registry(&self) -> ConfigResult<TypeRegistry> {
        let registry = TypeRegistry::from_descriptions(self.types.iter().cloned());
        for path in &self.type_files {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
            let loaded = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => registry.load_json(&content),
                Some("yaml") | Some("yml") => registry.load_yaml(&content),
                Some(other) => return Err(ConfigError::unsupported_format(other)),
                None => return Err(ConfigError::unsupported_format("(no extension)")),
            };
            let count = loaded.map_err(|e| ConfigError::from(e).with_path(path))?;
            tracing::debug!(path = %path.display(), count, "Loaded type descriptions");
        }
        Ok(registry)
    }
}

impl Default for CodecSection {
    fn default() -> Self {
        Self {
            reversible: default_reversible(),
            types: Vec::new(),
            type_files: Vec::new(),
        }
    }
}

fn default_reversible() -> bool {
    true
}

// =============================================================================
// LoggingConfig
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Validates the logging configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::validation(
                "logging.level",
                format!("unknown level '{other}'"),
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty format for development.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// Full format with all details.
    Full,
    /// JSON format for log collectors.
    Json,
}

impl LogFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Full => "full",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::validation(
                "logging.format",
                format!("unknown format '{other}'"),
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ualink_opcua::{EnumField, NodeId};

    fn description(id: u32, alias: &str) -> TypeDescription {
        TypeDescription::new(NodeId::numeric(2, id), vec![EnumField::new("Idle", 0)])
            .with_alias(alias)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = UalinkConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.codec.reversible);
        assert_eq!(config.scanner.max_probes, DEFAULT_MAX_PROBES);
        assert_eq!(config.scanner.port_ranges().unwrap(), PortRange::opc_ua());
        assert_eq!(config.scanner.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_scanner_validation() {
        let mut scanner = ScannerSection::default();
        scanner.max_probes = 0;
        assert!(matches!(
            scanner.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "scanner.max_probes"
        ));

        let mut scanner = ScannerSection::default();
        scanner.probe_timeout_ms = MAX_PROBE_TIMEOUT_MS + 1;
        assert!(scanner.validate().is_err());

        let mut scanner = ScannerSection::default();
        scanner.ports = "1-2-3".to_string();
        assert!(matches!(scanner.validate(), Err(ConfigError::Protocol(_))));
    }

    #[test]
    fn test_scanner_config() {
        let scanner = ScannerSection {
            max_probes: 8,
            probe_timeout_ms: 250,
            ..Default::default()
        };
        let config = scanner.scanner_config();
        assert_eq!(config.max_probes, 8);
        assert_eq!(config.probe_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_codec_duplicates() {
        let mut codec = CodecSection::default();
        codec.types = vec![description(1, "A"), description(2, "B")];
        assert!(codec.validate().is_ok());

        codec.types.push(description(1, "C"));
        assert!(codec.validate().is_err());

        codec.types = vec![description(1, "A"), description(2, "A")];
        assert!(codec.validate().is_err());
    }

    #[test]
    fn test_codec_registry() {
        let mut codec = CodecSection::default();
        codec.types = vec![description(1, "MachineState")];
        let registry = codec.registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("MachineState").is_some());
        assert!(registry.lookup("ns=2;i=1").is_some());
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
