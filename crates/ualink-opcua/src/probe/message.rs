// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA TCP handshake framing.
//!
//! Every frame starts with an 8-byte header:
//!
//! ```text
//! +-------------------+-----------+--------------------+
//! | Type (3 B ASCII)  | Chunk (1) | Length (u32 LE)    |
//! +-------------------+-----------+--------------------+
//!   "HEL" "ACK" "ERR"   'F'         header + body
//! ```
//!
//! Hello body: protocol version, receive buffer size, send buffer size,
//! max message size, max chunk count (all `u32`), then the endpoint URL as a
//! length-prefixed string. Acknowledge body: the same five `u32` fields.

use std::fmt;

use bytes::Bytes;
use ualink_core::{BinaryReader, BinaryWriter, WireResult};

/// Size of the frame header.
pub const HEADER_SIZE: usize = 8;

/// Size of the Acknowledge body.
pub const ACKNOWLEDGE_BODY_SIZE: usize = 20;

/// Size of a complete Acknowledge frame.
pub const ACKNOWLEDGE_SIZE: usize = HEADER_SIZE + ACKNOWLEDGE_BODY_SIZE;

/// Buffer and message size advertised in Hello frames.
pub const DEFAULT_BUFFER_SIZE: u32 = 65535;

/// Smallest buffer size a conforming server may advertise.
pub const MIN_BUFFER_SIZE: u32 = 8192;

/// Protocol version sent in Hello frames.
pub const PROTOCOL_VERSION: u32 = 0;

// =============================================================================
// MessageType
// =============================================================================

/// Frame types of the OPC UA TCP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Client Hello (`HELF`).
    Hello,
    /// Server Acknowledge (`ACKF`).
    Acknowledge,
    /// Transport error (`ERRF`).
    Error,
    /// Reverse Hello (`RHEF`).
    ReverseHello,
    /// Open secure channel (`OPNF`).
    OpenChannel,
    /// Secure message (`MSGF`).
    Message,
    /// Close secure channel (`CLOF`).
    CloseChannel,
}

impl MessageType {
    const ALL: [MessageType; 7] = [
        Self::Hello,
        Self::Acknowledge,
        Self::Error,
        Self::ReverseHello,
        Self::OpenChannel,
        Self::Message,
        Self::CloseChannel,
    ];

    /// Returns the 4-byte tag including the final chunk marker.
    pub const fn tag(self) -> &'static [u8; 4] {
        match self {
            Self::Hello => b"HELF",
            Self::Acknowledge => b"ACKF",
            Self::Error => b"ERRF",
            Self::ReverseHello => b"RHEF",
            Self::OpenChannel => b"OPNF",
            Self::Message => b"MSGF",
            Self::CloseChannel => b"CLOF",
        }
    }

    /// Looks up a 4-byte tag.
    pub fn from_tag(tag: &[u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hello => "Hello",
            Self::Acknowledge => "Acknowledge",
            Self::Error => "Error",
            Self::ReverseHello => "ReverseHello",
            Self::OpenChannel => "OpenSecureChannel",
            Self::Message => "Message",
            Self::CloseChannel => "CloseSecureChannel",
        };
        f.write_str(name)
    }
}

// =============================================================================
// MessageHeader
// =============================================================================

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Raw type tag.
    pub tag: [u8; 4],
    /// Declared total length including the header.
    pub length: u32,
}

impl MessageHeader {
    /// Parses a header from its 8 bytes.
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        let [t0, t1, t2, t3, l0, l1, l2, l3] = *bytes;
        Self {
            tag: [t0, t1, t2, t3],
            length: u32::from_le_bytes([l0, l1, l2, l3]),
        }
    }

    /// Returns the frame type, if the tag is recognised.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_tag(&self.tag)
    }

    /// Returns the tag as printable text.
    pub fn tag_text(&self) -> String {
        self.tag.escape_ascii().to_string()
    }
}

/// Builds a frame with the given type and body.
pub fn encode_frame(message_type: MessageType, body: &[u8]) -> Bytes {
    let mut writer = BinaryWriter::with_capacity(HEADER_SIZE + body.len());
    writer.write_raw(message_type.tag());
    writer.write_u32(0);
    writer.write_raw(body);
    let length = u32::try_from(writer.len()).unwrap_or(u32::MAX);
    writer.patch_u32(4, length);
    writer.into_bytes()
}

// =============================================================================
// HelloMessage
// =============================================================================

/// Client Hello frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloMessage {
    /// Protocol version.
    pub protocol_version: u32,
    /// Largest chunk the client can receive.
    pub receive_buffer_size: u32,
    /// Largest chunk the client will send.
    pub send_buffer_size: u32,
    /// Largest message the client accepts.
    pub max_message_size: u32,
    /// Largest number of chunks per message.
    pub max_chunk_count: u32,
    /// Endpoint URL the client connects to.
    pub endpoint_url: String,
}

impl HelloMessage {
    /// Creates a Hello with the default limits for `endpoint_url`.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            receive_buffer_size: DEFAULT_BUFFER_SIZE,
            send_buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: DEFAULT_BUFFER_SIZE,
            max_chunk_count: DEFAULT_BUFFER_SIZE,
            endpoint_url: endpoint_url.into(),
        }
    }

    /// Encodes the complete frame.
    pub fn encode(&self) -> Bytes {
        let mut body = BinaryWriter::with_capacity(24 + self.endpoint_url.len());
        body.write_u32(self.protocol_version);
        body.write_u32(self.receive_buffer_size);
        body.write_u32(self.send_buffer_size);
        body.write_u32(self.max_message_size);
        body.write_u32(self.max_chunk_count);
        body.write_string(Some(&self.endpoint_url));
        encode_frame(MessageType::Hello, body.as_slice())
    }

    /// Decodes a Hello body.
    pub fn decode_body(body: &[u8]) -> WireResult<Self> {
        let mut reader = BinaryReader::new(body);
        Ok(Self {
            protocol_version: reader.read_u32()?,
            receive_buffer_size: reader.read_u32()?,
            send_buffer_size: reader.read_u32()?,
            max_message_size: reader.read_u32()?,
            max_chunk_count: reader.read_u32()?,
            endpoint_url: reader.read_string()?.unwrap_or_default(),
        })
    }
}

// =============================================================================
// AcknowledgeMessage
// =============================================================================

/// Server Acknowledge frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcknowledgeMessage {
    /// Protocol version supported by the server.
    pub protocol_version: u32,
    /// Largest chunk the server can receive.
    pub receive_buffer_size: u32,
    /// Largest chunk the server will send.
    pub send_buffer_size: u32,
    /// Largest message the server accepts.
    pub max_message_size: u32,
    /// Largest number of chunks per message.
    pub max_chunk_count: u32,
}

impl AcknowledgeMessage {
    /// Creates an Acknowledge with default limits.
    pub fn new(protocol_version: u32) -> Self {
        Self {
            protocol_version,
            receive_buffer_size: DEFAULT_BUFFER_SIZE,
            send_buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: 0,
            max_chunk_count: 0,
        }
    }

    /// Decodes an Acknowledge body.
    pub fn decode_body(body: &[u8]) -> WireResult<Self> {
        let mut reader = BinaryReader::new(body);
        Ok(Self {
            protocol_version: reader.read_u32()?,
            receive_buffer_size: reader.read_u32()?,
            send_buffer_size: reader.read_u32()?,
            max_message_size: reader.read_u32()?,
            max_chunk_count: reader.read_u32()?,
        })
    }

    /// Encodes the complete frame.
    pub fn encode(&self) -> Bytes {
        let mut body = BinaryWriter::with_capacity(ACKNOWLEDGE_BODY_SIZE);
        body.write_u32(self.protocol_version);
        body.write_u32(self.receive_buffer_size);
        body.write_u32(self.send_buffer_size);
        body.write_u32(self.max_message_size);
        body.write_u32(self.max_chunk_count);
        encode_frame(MessageType::Acknowledge, body.as_slice())
    }

    /// Returns `true` if either buffer size is below [`MIN_BUFFER_SIZE`].
    pub fn has_small_buffers(&self) -> bool {
        self.receive_buffer_size < MIN_BUFFER_SIZE || self.send_buffer_size < MIN_BUFFER_SIZE
    }
}
