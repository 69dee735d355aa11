// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! Loading runs in a fixed order:
//!
//! 1. Read the file and pick the format from its extension
//! 2. Replace `${VAR}` and `${VAR:default}` placeholders
//! 3. Parse YAML (`config` crate), TOML or JSON
//! 4. Apply `UALINK_*` environment overrides
//! 5. Resolve relative type file paths against the file's directory
//! 6. Validate
//!
//! # Environment Overrides
//!
//! ```text
//! UALINK_SCANNER_ADDRESSES=10.0.0.1,10.0.0.2
//! UALINK_SCANNER_PORTS=4840-4841;50000
//! UALINK_SCANNER_MAX_PROBES=32
//! UALINK_SCANNER_PROBE_TIMEOUT_MS=2000
//! UALINK_CODEC_REVERSIBLE=false
//! UALINK_LOG_LEVEL=debug
//! UALINK_LOG_FORMAT=json
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::UalinkConfig;

/// Default prefix of environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "UALINK";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads and validates [`UalinkConfig`] documents.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
    env_prefix: String,
    resolve_env_vars: bool,
    resolve_paths: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with placeholders, overrides and path resolution
    /// enabled.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Returns a builder.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::default()
    }

    /// Sets the directory relative paths resolve against.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment override prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and environment overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads configuration from a `.yaml`, `.yml`, `.toml` or `.json` file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<UalinkConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let format = ConfigFormat::from_path(path)?;
        let content = self.read_file(path)?;
        let mut config = self
            .parse(&content, format)
            .map_err(|e| e.with_path(path))?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            let base_path = self.base_path.clone().unwrap_or_else(|| {
                path.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."))
            });
            resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        debug!(
            types = config.codec.types.len(),
            type_files = config.codec.type_files.len(),
            ports = %config.scanner.ports,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads configuration from in-memory content.
    ///
    /// Relative paths resolve against the base path, when one is set.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<UalinkConfig> {
        let mut config = self.parse(content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if let (true, Some(base_path)) = (self.resolve_paths, &self.base_path) {
            resolve_relative_paths(&mut config, base_path);
        }

        config.validate()?;
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse(&self, content: &str, format: ConfigFormat) -> ConfigResult<UalinkConfig> {
        if self.resolve_env_vars {
            let content = resolve_env_placeholders(content);
            parse_str(&content, format)
        } else {
            parse_str(content, format)
        }
    }

    fn env_name(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key)
    }

    fn env_value(&self, key: &str) -> Option<(String, String)> {
        let name = self.env_name(key);
        env::var(&name).ok().map(|value| (name, value))
    }

    fn apply_env_overrides(&self, config: &mut UalinkConfig) -> ConfigResult<()> {
        if let Some((_, value)) = self.env_value("SCANNER_ADDRESSES") {
            config.scanner.addresses = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some((_, value)) = self.env_value("SCANNER_PORTS") {
            config.scanner.ports = value;
        }
        if let Some((name, value)) = self.env_value("SCANNER_MAX_PROBES") {
            config.scanner.max_probes = parse_env(&name, &value, "expected a probe count")?;
        }
        if let Some((name, value)) = self.env_value("SCANNER_PROBE_TIMEOUT_MS") {
            config.scanner.probe_timeout_ms =
                parse_env(&name, &value, "expected milliseconds")?;
        }
        if let Some((name, value)) = self.env_value("CODEC_REVERSIBLE") {
            config.codec.reversible = parse_bool(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a boolean"))?;
        }
        if let Some((name, value)) = self.env_value("LOG_LEVEL") {
            config.logging.level = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected a log level"))?;
        }
        if let Some((name, value)) = self.env_value("LOG_FORMAT") {
            config.logging.format = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected a log format"))?;
        }
        Ok(())
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for [`ConfigLoader`].
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    base_path: Option<PathBuf>,
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    resolve_paths: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Sets the directory relative paths resolve against.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment override prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables placeholders and environment overrides.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables relative path resolution.
    pub fn resolve_paths(mut self, enabled: bool) -> Self {
        self.resolve_paths = Some(enabled);
        self
    }

    /// Builds the loader.
    pub fn build(self) -> ConfigLoader {
        let defaults = ConfigLoader::new();
        ConfigLoader {
            base_path: self.base_path,
            env_prefix: self.env_prefix.unwrap_or(defaults.env_prefix),
            resolve_env_vars: self.resolve_env_vars.unwrap_or(defaults.resolve_env_vars),
            resolve_paths: self.resolve_paths.unwrap_or(defaults.resolve_paths),
        }
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML.
    Yaml,
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some(ext) => ext.parse(),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(ConfigError::unsupported_format(other)),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Yaml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::parse(e.to_string())),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::parse(e.to_string())),
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))
        }
    }
}

/// Replaces `${VAR}` and `${VAR:default}` placeholders.
///
/// Unknown variables without a default and unterminated placeholders are kept
/// verbatim.
fn resolve_env_placeholders(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let placeholder = &after[..end];
        let (name, default) = match placeholder.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (placeholder, None),
        };

        match (env::var(name), default) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => {
                warn!(variable = name, "Environment variable not found");
                result.push_str(&rest[start..start + 2 + end + 1]);
            }
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

fn resolve_relative_paths(config: &mut UalinkConfig, base_path: &Path) {
    for path in &mut config.codec.type_files {
        if path.is_relative() {
            *path = base_path.join(&*path);
        }
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str, expected: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_env_var(name, expected))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with the default loader.
///
/// # Examples
///
/// ```no_run
/// use ualink_config::loader::load_config;
///
/// let config = load_config("ualink.yaml").unwrap();
/// println!("Scanning ports {}", config.scanner.ports);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<UalinkConfig> {
    ConfigLoader::new().load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LogLevel;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("ualink")).is_err());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            resolve_env_placeholders("ports: ${UALINK_UNSET_PORTS_7F3A:4840}"),
            "ports: 4840"
        );
        assert_eq!(
            resolve_env_placeholders("a ${UALINK_UNSET_7F3A} b"),
            "a ${UALINK_UNSET_7F3A} b"
        );
        assert_eq!(resolve_env_placeholders("cost: $5 ${open"), "cost: $5 ${open");
        assert_eq!(resolve_env_placeholders("${X_7F3A_UNSET:}"), "");
    }

    #[test]
    fn test_load_yaml_str() {
        let yaml = r#"
scanner:
  ports: "4840;50000"
  max_probes: 16
codec:
  reversible: false
  types:
    - type_id: "ns=2;i=3063"
      alias: MachineState
      fields:
        - { name: Idle, code: 0 }
        - { name: Running, code: 1 }
logging:
  level: debug
"#;
        let config = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str(yaml, ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(config.scanner.max_probes, 16);
        assert_eq!(config.scanner.port_ranges().unwrap().len(), 2);
        assert!(!config.codec.reversible);
        assert_eq!(config.codec.types[0].fields().len(), 2);
        assert_eq!(config.codec.types[0].alias(), Some("MachineState"));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_load_toml_and_json_str() {
        let toml = "[scanner]\nmax_probes = 4\n";
        let config = ConfigLoader::new()
            .load_from_str(toml, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.scanner.max_probes, 4);

        let json = r#"{"codec": {"types": [{"type_id": "i=852", "fields": [{"name": "Running", "code": 0}]}]}}"#;
        let config = ConfigLoader::new()
            .load_from_str(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.codec.types.len(), 1);
        assert!(config.codec.reversible);
    }

    #[test]
    fn test_parse_error() {
        let result = ConfigLoader::new().load_from_str("{not json", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::Parse { path: None, .. })));
    }

    #[test]
    fn test_validation_runs() {
        let result = ConfigLoader::new().load_from_str("[scanner]\nmax_probes = 0\n", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("TEST")
            .resolve_paths(false)
            .build();
        assert_eq!(loader.env_prefix, "TEST");
        assert!(loader.resolve_env_vars);
        assert!(!loader.resolve_paths);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
