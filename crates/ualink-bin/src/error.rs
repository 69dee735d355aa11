// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors of the `ualink` tool and their process exit codes.
//!
//! | Exit | Variant |
//! |------|---------|
//! | 1 | [`BinError::Configuration`], [`BinError::Config`] |
//! | 2 | [`BinError::Initialization`] |
//! | 3 | [`BinError::Runtime`] |
//! | 4 | [`BinError::Io`] |
//! | 5 | [`BinError::NotFound`] |
//! | 6 | [`BinError::Protocol`] |

use thiserror::Error;
use ualink_config::ConfigError;
use ualink_opcua::{CodecError, ErrorCode, OpcUaError};

/// Result type alias for ualink-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Failure of a `ualink` command.
#[derive(Debug, Error)]
pub enum BinError {
    /// Rejected arguments: endpoints, hex input, unknown type keys.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging could not be set up.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Scan interrupted or report output failed.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// No OPC UA server answered.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration file could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Failure raised by the protocol core.
    #[error("Protocol error: {0}")]
    Protocol(#[from] OpcUaError),

    /// Another error plus the step that raised it.
    #[error("{context}: {source}")]
    WithContext {
        /// Step being performed.
        context: String,
        /// The wrapped error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Shorthand for [`BinError::Configuration`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shorthand for [`BinError::Initialization`].
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Shorthand for [`BinError::Runtime`].
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Shorthand for [`BinError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Wraps the error with the step that raised it.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Exit code of the process, see the module table.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::NotFound(_) => 5,
            Self::Protocol(_) => 6,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// `UA-XXYY` code of a protocol core failure.
    pub fn protocol_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Protocol(error) => Some(error.error_code()),
            Self::Config(ConfigError::Protocol(error)) => {
                Some(OpcUaError::configuration(error.clone()).error_code())
            }
            Self::WithContext { source, .. } => source.protocol_code(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<CodecError> for BinError {
    fn from(err: CodecError) -> Self {
        Self::Protocol(OpcUaError::codec(err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Writes the error, its protocol code and its causes to stderr.
pub fn report_error(error: &BinError) {
    match error.protocol_code() {
        Some(code) => eprintln!("Error [{code}]: {error}"),
        None => eprintln!("Error: {error}"),
    }

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {cause}");
        source = cause.source();
    }
}

/// Reports `error` and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
