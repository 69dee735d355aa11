// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types.
//!
//! # Error Hierarchy
//!
//! ```text
//! ConfigError
//! ├── FileNotFound      - Configuration file does not exist
//! ├── Io                - File could not be read
//! ├── Parse             - Document is not valid YAML/TOML/JSON
//! ├── Validation        - Document parsed but a value is rejected
//! ├── InvalidEnvVar     - Environment override has a bad value
//! ├── UnsupportedFormat - Unknown file extension
//! └── Protocol          - Setting rejected by the protocol core
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use ualink_opcua::{ConfigurationError, OpcUaError};

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// File could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Document could not be parsed.
    #[error("Failed to parse {}: {message}", describe_source(.path))]
    Parse {
        /// Source file, when loaded from disk.
        path: Option<PathBuf>,
        /// Parser message.
        message: String,
    },

    /// A value failed validation.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// An environment override holds an unusable value.
    #[error("Invalid environment variable '{name}': {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// What was expected.
        message: String,
    },

    /// Unknown configuration format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The rejected extension.
        format: String,
    },

    /// A setting rejected by the protocol core.
    #[error("{0}")]
    Protocol(#[from] ConfigurationError),
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a parse error for in-memory content.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            path: None,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Attaches the source file to a parse error.
    pub fn with_path(self, file: impl AsRef<Path>) -> Self {
        match self {
            Self::Parse { path: None, message } => Self::Parse {
                path: Some(file.as_ref().to_path_buf()),
                message,
            },
            other => other,
        }
    }

    /// Returns `true` if the error came from the file system.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::Io { .. })
    }

    /// Returns a short name for the error kind.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "file_not_found",
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::InvalidEnvVar { .. } => "invalid_env_var",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Protocol(_) => "protocol",
        }
    }
}

fn describe_source(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!("'{}'", path.display()),
        None => "configuration".to_string(),
    }
}

impl From<OpcUaError> for ConfigError {
    fn from(error: OpcUaError) -> Self {
        match error {
            OpcUaError::Configuration(inner) => Self::Protocol(inner),
            other => Self::parse(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let error = ConfigError::validation("scanner.max_probes", "must be at least 1");
        assert_eq!(
            error.to_string(),
            "Invalid value for 'scanner.max_probes': must be at least 1"
        );

        let error = ConfigError::parse("unexpected token");
        assert_eq!(error.to_string(), "Failed to parse configuration: unexpected token");

        let error = error.with_path("ualink.yaml");
        assert_eq!(
            error.to_string(),
            "Failed to parse 'ualink.yaml': unexpected token"
        );
    }

    #[test]
    fn test_classification() {
        assert!(ConfigError::file_not_found("missing.yaml").is_io_error());
        assert!(!ConfigError::unsupported_format("ini").is_io_error());
        assert_eq!(ConfigError::unsupported_format("ini").error_type(), "unsupported_format");
    }

    #[test]
    fn test_from_protocol_error() {
        let error: ConfigError =
            ConfigurationError::invalid_port_range("1-2-3", "Bad range format").into();
        assert_eq!(error.error_type(), "protocol");
        assert!(error.to_string().contains("1-2-3"));
    }
}
