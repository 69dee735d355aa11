// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA type metadata.
//!
//! This module provides the types the value codec works on:
//!
//! - **NodeId**: All four OPC UA node identifier types with parsing and display
//! - **EnumField**: One `(name, code)` pair of an enumerated type
//! - **TypeDescription**: Immutable, ordered field list of an enumerated type
//! - **EnumValue**: A decoded `(symbol, code)` pair
//!
//! # Examples
//!
//! ```
//! use ualink_opcua::types::{EnumField, NodeId, TypeDescription};
//!
//! let description = TypeDescription::new(
//!     NodeId::numeric(2, 3063),
//!     vec![EnumField::new("Idle", 0), EnumField::new("Running", 1)],
//! )
//! .with_alias("MachineState");
//!
//! assert_eq!(description.find_by_code(1).map(|f| f.name()), Some("Running"));
//! assert_eq!(description.display_name(), "MachineState");
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, OpcUaError};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA Node Identifier.
///
/// A NodeId consists of a namespace index and an identifier which can be
/// numeric, string, GUID, or opaque (byte string). It serializes to and from
/// the OPC UA text form, e.g. `ns=2;i=1001`.
///
/// # Examples
///
/// ```
/// use ualink_opcua::types::NodeId;
///
/// let numeric = NodeId::numeric(2, 1001);
/// assert_eq!(numeric.to_string(), "ns=2;i=1001");
///
/// let parsed: NodeId = "ns=2;s=MyDevice.State".parse().unwrap();
/// assert_eq!(parsed, NodeId::string(2, "MyDevice.State"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }
}

/// Writes `ns=<namespace>;{i|s|g|b}=<identifier>`, omitting namespace 0.
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "ns={};{}", self.namespace_index, self.identifier)
        }
    }
}

impl FromStr for NodeId {
    type Err = OpcUaError;

    /// Parses a NodeId from OPC UA string format.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64 encoded)
    /// - `i=1001` / `s=MyNode` (namespace 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| {
            OpcUaError::configuration(ConfigurationError::invalid_node_id(s, reason))
        };

        let (namespace_index, identifier_part) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns, id) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace"))?;
                let ns: u16 = ns.parse().map_err(|_| invalid("Invalid namespace index"))?;
                (ns, id)
            }
            None => (0, s),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            NodeIdentifier::Numeric(id.parse().map_err(|_| invalid("Invalid numeric identifier"))?)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            NodeIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            NodeIdentifier::Guid(Uuid::parse_str(id).map_err(|_| invalid("Invalid GUID"))?)
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            NodeIdentifier::Opaque(BASE64.decode(id).map_err(|_| invalid("Invalid base64"))?)
        } else {
            return Err(invalid("Unknown identifier type. Expected i=, s=, g=, or b="));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

impl TryFrom<String> for NodeId {
    type Error = OpcUaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.to_string()
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// OPC UA node identifier types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeIdentifier {
    /// Numeric identifier.
    Numeric(u32),

    /// String identifier.
    String(String),

    /// GUID identifier.
    Guid(Uuid),

    /// Opaque identifier (application-specific byte array).
    Opaque(Vec<u8>),
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v)),
        }
    }
}

// =============================================================================
// EnumField
// =============================================================================

/// One symbolic name and integer code of an enumerated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumField {
    name: String,
    code: i32,
}

impl EnumField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }

    /// Returns the symbolic name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the integer code.
    #[inline]
    pub fn code(&self) -> i32 {
        self.code
    }
}

// =============================================================================
// TypeDescription
// =============================================================================

/// Metadata of an enumerated type.
///
/// Fields keep declaration order; the first field is the default used when
/// input cannot be resolved. Codes are neither required to be contiguous nor
/// unique, lookups return the first match. An empty field list is valid and
/// means no metadata is known for the type.
///
/// Descriptions are immutable once built and shared behind `Arc` by the
/// [`TypeRegistry`](crate::registry::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    type_id: NodeId,

    #[serde(default)]
    fields: Vec<EnumField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

impl TypeDescription {
    /// Creates a description with the given fields in declaration order.
    pub fn new(type_id: NodeId, fields: Vec<EnumField>) -> Self {
        Self {
            type_id,
            fields,
            alias: None,
        }
    }

    /// Creates a description with no known fields.
    pub fn empty(type_id: NodeId) -> Self {
        Self::new(type_id, Vec::new())
    }

    /// Sets the display alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the type identifier.
    #[inline]
    pub fn type_id(&self) -> &NodeId {
        &self.type_id
    }

    /// Returns the fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[EnumField] {
        &self.fields
    }

    /// Returns the display alias, if any.
    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns `true` if no fields are known.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the default (first declared) field.
    #[inline]
    pub fn first_field(&self) -> Option<&EnumField> {
        self.fields.first()
    }

    /// Returns the first field with the given code.
    pub fn find_by_code(&self, code: i32) -> Option<&EnumField> {
        self.fields.iter().find(|f| f.code == code)
    }

    /// Returns the first field whose name matches, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<&EnumField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Returns the alias, falling back to the type identifier.
    pub fn display_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.type_id.to_string(),
        }
    }
}

// =============================================================================
// EnumValue
// =============================================================================

/// A decoded enumeration value.
///
/// `symbol` is present only when the code resolved to a known field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    /// Symbolic name of the matching field.
    pub symbol: Option<String>,

    /// Integer code.
    pub code: i32,
}

impl EnumValue {
    /// Creates a value.
    pub fn new(symbol: Option<String>, code: i32) -> Self {
        Self { symbol, code }
    }

    /// Creates a value without a symbolic name.
    pub fn from_code(code: i32) -> Self {
        Self { symbol: None, code }
    }

    /// Creates a value naming `field`.
    pub fn from_field(field: &EnumField) -> Self {
        Self {
            symbol: Some(field.name.clone()),
            code: field.code,
        }
    }

    /// Resolves `code` against `description`.
    ///
    /// The symbol is filled in only if a field declares the code.
    pub fn resolve(description: &TypeDescription, code: i32) -> Self {
        match description.find_by_code(code) {
            Some(field) => Self::from_field(field),
            None => Self::from_code(code),
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{} ({})", symbol, self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
