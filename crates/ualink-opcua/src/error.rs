// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA protocol error types.
//!
//! Expected failures of the transport probe (refused connections, peers that
//! do not speak OPC UA, malformed frames) are never surfaced as errors; they
//! resolve to a negative probe outcome plus a diagnostic event. The types in
//! this module cover what remains:
//!
//! - programming errors in the code driving a probe,
//! - malformed codec input that the capability itself cannot read,
//! - invalid configuration (node ids, port ranges, timeouts),
//! - address resolution failures of the scanner.
//!
//! # Error Categories
//!
//! ```text
//! OpcUaError
//! ├── Probe         - Probe driven out of protocol order
//! ├── Codec         - Encoder/decoder capability failures
//! ├── Wire          - Truncated or malformed binary input
//! ├── Connection    - Address resolution and socket setup
//! └── Configuration - Invalid settings
//! ```
//!
//! # Examples
//!
//! ```
//! use ualink_opcua::error::{OpcUaError, ConfigurationError, ErrorSeverity};
//!
//! let error = OpcUaError::configuration(ConfigurationError::invalid_port_range(
//!     "1-2-3",
//!     "Bad range format",
//! ));
//! assert_eq!(error.severity(), ErrorSeverity::Critical);
//! assert_eq!(error.error_code().to_string(), "UA-0401");
//! ```

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;
use ualink_core::WireError;

/// Result type alias for OPC UA operations.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// OpcUaError - Main Error Type
// =============================================================================

/// The main error type for the OPC UA protocol core.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Probe driven with an event that cannot occur in its current state.
    #[error("{0}")]
    Probe(#[from] ProbeError),

    /// Encoder or decoder capability failure.
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// Truncated or malformed binary input.
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// Address resolution or socket setup failure.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl OpcUaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a probe error.
    #[inline]
    pub fn probe(error: ProbeError) -> Self {
        Self::Probe(error)
    }

    /// Creates a codec error.
    #[inline]
    pub fn codec(error: CodecError) -> Self {
        Self::Codec(error)
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Probe(_) => ErrorSeverity::Error,
            Self::Codec(_) | Self::Wire(_) => ErrorSeverity::Warning,
            Self::Connection(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category recorded by [`Self::log`].
    pub fn category(&self) -> &'static str {
        match self {
            Self::Probe(_) => "probe",
            Self::Codec(_) => "codec",
            Self::Wire(_) => "wire",
            Self::Connection(_) => "connection",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Probe(e) => e.error_code(),
            Self::Codec(e) => e.error_code(),
            Self::Wire(_) => ErrorCode::new(2, 0x10),
            Self::Connection(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Logs this error at its severity's level.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.severity().to_tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            _ => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ProbeError
// =============================================================================

/// Errors raised when a transport probe is driven out of protocol order.
///
/// These indicate a defect in the I/O driver, never a property of the peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// An I/O completion arrived that the current state cannot accept.
    #[error("Unexpected {event} completion in probe state {state}")]
    UnexpectedEvent {
        /// Probe state when the event arrived.
        state: &'static str,
        /// Kind of event delivered.
        event: &'static str,
    },

    /// I/O was requested while the probe owns no socket.
    #[error("Probe has no connected socket in state {state}")]
    NoSocket {
        /// Probe state at the time of the request.
        state: &'static str,
    },

    /// I/O was requested while no operation is pending.
    #[error("No I/O operation pending in probe state {state}")]
    NothingPending {
        /// Probe state at the time of the request.
        state: &'static str,
    },
}

impl ProbeError {
    /// Creates an unexpected event error.
    pub fn unexpected_event(state: &'static str, event: &'static str) -> Self {
        Self::UnexpectedEvent { state, event }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedEvent { .. } => ErrorCode::new(1, 0x01),
            Self::NoSocket { .. } => ErrorCode::new(1, 0x02),
            Self::NothingPending { .. } => ErrorCode::new(1, 0x03),
        }
    }
}

// =============================================================================
// CodecError
// =============================================================================

/// Errors raised by encoder/decoder capabilities.
///
/// The enumeration rules themselves are total; these errors come from the
/// capability failing to produce a token at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// JSON input could not be parsed.
    #[error("Invalid JSON input: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },

    /// JSON input parsed but is not an object.
    #[error("JSON input must be an object, got {actual}")]
    NotAnObject {
        /// JSON type that was found instead.
        actual: &'static str,
    },

    /// Binary input could not be read.
    #[error("Binary decode of field '{field}' failed: {source}")]
    Binary {
        /// Field being decoded.
        field: String,
        /// Underlying wire error.
        #[source]
        source: WireError,
    },
}

impl CodecError {
    /// Creates an invalid JSON error.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
        }
    }

    /// Creates a binary read error for `field`.
    pub fn binary(field: impl Into<String>, source: WireError) -> Self {
        Self::Binary {
            field: field.into(),
            source,
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson { .. } => ErrorCode::new(2, 0x01),
            Self::NotAnObject { .. } => ErrorCode::new(2, 0x02),
            Self::Binary { .. } => ErrorCode::new(2, 0x03),
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Address resolution and socket setup errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Host name could not be resolved.
    #[error("Failed to resolve host '{host}'")]
    DnsResolutionFailed {
        /// The host name.
        host: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<io::Error>,
    },

    /// Generic I/O failure outside a probe.
    #[error("I/O error: {message}")]
    Io {
        /// Context message.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ConnectionError {
    /// Creates a DNS resolution error.
    pub fn dns_failed(host: impl Into<String>, source: Option<io::Error>) -> Self {
        Self::DnsResolutionFailed {
            host: host.into(),
            source,
        }
    }

    /// Creates an I/O error with context.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::DnsResolutionFailed { .. } => ErrorCode::new(3, 0x01),
            Self::Io { .. } => ErrorCode::new(3, 0x02),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Invalid node ID format.
    #[error("Invalid node ID format: {node_id} ({reason})")]
    InvalidNodeId {
        /// The invalid node ID.
        node_id: String,
        /// Reason.
        reason: String,
    },

    /// Invalid port range text.
    #[error("Invalid port range '{value}': {reason}")]
    InvalidPortRange {
        /// The rejected text.
        value: String,
        /// Reason.
        reason: String,
    },

    /// Invalid timeout value.
    #[error("Invalid timeout: {duration:?} ({reason})")]
    InvalidTimeout {
        /// The invalid duration.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// Invalid numeric or named setting.
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting {
        /// Setting name.
        name: String,
        /// Reason.
        reason: String,
    },

    /// Invalid type description document.
    #[error("Invalid type description: {message}")]
    InvalidTypeDescription {
        /// Parser or validation message.
        message: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid node ID error.
    pub fn invalid_node_id(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid port range error.
    pub fn invalid_port_range(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPortRange {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid timeout error.
    pub fn invalid_timeout(duration: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            duration,
            reason: reason.into(),
        }
    }

    /// Creates an invalid setting error.
    pub fn invalid_setting(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid type description error.
    pub fn invalid_type_description(message: impl Into<String>) -> Self {
        Self::InvalidTypeDescription {
            message: message.into(),
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidPortRange { .. } => ErrorCode::new(4, 0x01),
            Self::InvalidNodeId { .. } => ErrorCode::new(4, 0x02),
            Self::InvalidTimeout { .. } => ErrorCode::new(4, 0x03),
            Self::InvalidTypeDescription { .. } => ErrorCode::new(4, 0x04),
            Self::InvalidSetting { .. } => ErrorCode::new(4, 0x05),
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Bad input or an unreachable host.
    Warning,
    /// Defect in the code driving the protocol.
    Error,
    /// Settings that keep the tool from running.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
///
/// Format: `UA-XXYY` where XX is category and YY is specific error.
///
/// Categories:
/// - 1: Probe
/// - 2: Codec / wire
/// - 3: Connection
/// - 4: Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1-4).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Tests
// =============================================================================
