// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA server probe.
//!
//! [`ServerProbe`] decides whether a TCP peer is an OPC UA server by sending
//! a Hello frame and validating the Acknowledge that comes back. It never
//! opens a secure channel.
//!
//! # State Machine
//!
//! ```text
//!  BeginProbe ──connected──> SendHello ──all sent──> ReceiveSize
//!      ^                                                  │
//!      │                                       ACKF, 28..=65535 bytes
//!      │                                                  v
//!      └──────── done (ok or failed) ────────────── ReceiveAck
//! ```
//!
//! The probe performs no I/O scheduling of its own. A driver delivers every
//! completed connect, send or receive through [`ServerProbe::on_io_complete`]
//! and arms the next step with the returned timeout. [`ServerProbe::run`]
//! is such a driver built on tokio.
//!
//! Expected failures (refused or reset connections, peers speaking another
//! protocol, malformed frames) complete the probe with `ok == false` and a
//! tracing event carrying an `event` field; only out-of-order driving
//! returns [`ProbeError`].

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::message::{
    AcknowledgeMessage, HelloMessage, MessageHeader, MessageType, ACKNOWLEDGE_SIZE,
    DEFAULT_BUFFER_SIZE, HEADER_SIZE, MIN_BUFFER_SIZE,
};
use crate::error::{OpcUaError, ProbeError};

/// Default timeout for each I/O step.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// ProbeState
// =============================================================================

/// Handshake progress of a [`ServerProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProbeState {
    /// Waiting for a connected socket.
    #[default]
    BeginProbe,
    /// Sending the Hello frame.
    SendHello,
    /// Receiving the 8-byte response header.
    ReceiveSize,
    /// Receiving the Acknowledge body.
    ReceiveAck,
}

impl ProbeState {
    /// Returns the state name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BeginProbe => "BeginProbe",
            Self::SendHello => "SendHello",
            Self::ReceiveSize => "ReceiveSize",
            Self::ReceiveAck => "ReceiveAck",
        }
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Events and status
// =============================================================================

/// Completion delivered to [`ServerProbe::on_io_complete`].
#[derive(Debug)]
pub enum ProbeEvent<S> {
    /// A connection attempt succeeded.
    Connected {
        /// The connected socket; the probe takes ownership.
        socket: S,
        /// Address of the peer.
        remote: SocketAddr,
    },
    /// A send or receive moved this many bytes.
    Transferred(usize),
    /// A connect, send or receive failed.
    Failed(io::Error),
}

impl<S> ProbeEvent<S> {
    /// Returns the event kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Transferred(_) => "transferred",
            Self::Failed(_) => "failed",
        }
    }
}

/// Outcome of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStatus {
    /// `true` once the probe reached a terminal outcome.
    pub done: bool,
    /// `true` if the peer answered with a valid Acknowledge.
    pub ok: bool,
    /// Timeout to arm the next I/O step with.
    pub timeout: Duration,
}

/// I/O operation the driver has to perform next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingIo {
    /// Send the remaining bytes of the Hello frame.
    Send {
        /// Bytes still to be sent.
        remaining: usize,
    },
    /// Receive more of the response.
    Receive {
        /// Bytes still to be received.
        remaining: usize,
    },
}

// =============================================================================
// ServerProbe
// =============================================================================

/// Hello/Acknowledge handshake probe for one endpoint at a time.
///
/// The probe owns at most one socket. It returns to
/// [`ProbeState::BeginProbe`] and drops the socket whenever it completes, and
/// can then be reused for another endpoint.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use ualink_opcua::probe::ServerProbe;
///
/// # async fn example() {
/// let mut probe: ServerProbe = ServerProbe::new(Duration::from_secs(2));
/// let found = probe.probe("127.0.0.1:4840".parse().unwrap()).await;
/// println!("OPC UA server: {found}");
/// # }
/// ```
#[derive(Debug)]
pub struct ServerProbe<S = TcpStream> {
    state: ProbeState,
    socket: Option<S>,
    remote: Option<SocketAddr>,
    buffer: Vec<u8>,
    offset: usize,
    timeout: Duration,
    acknowledge: Option<AcknowledgeMessage>,
}

impl<S> Default for ServerProbe<S> {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl<S> ServerProbe<S> {
    /// Creates a probe with the given per-step timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: ProbeState::BeginProbe,
            socket: None,
            remote: None,
            buffer: Vec::with_capacity(ACKNOWLEDGE_SIZE),
            offset: 0,
            timeout,
            acknowledge: None,
        }
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Returns the per-step timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the peer of the probe in progress.
    #[inline]
    pub fn remote(&self) -> Option<SocketAddr> {
        self.remote
    }

    /// Returns the Acknowledge of the last successful probe.
    #[inline]
    pub fn acknowledge(&self) -> Option<&AcknowledgeMessage> {
        self.acknowledge.as_ref()
    }

    /// Returns the I/O operation the driver has to perform next.
    pub fn pending_io(&self) -> Option<PendingIo> {
        let remaining = self.buffer.len() - self.offset;
        match self.state {
            ProbeState::BeginProbe => None,
            ProbeState::SendHello => Some(PendingIo::Send { remaining }),
            ProbeState::ReceiveSize | ProbeState::ReceiveAck => {
                Some(PendingIo::Receive { remaining })
            }
        }
    }

    /// Drops the owned socket and returns to [`ProbeState::BeginProbe`].
    ///
    /// Returns `true` if a connected socket was closed.
    pub fn reset(&mut self) -> bool {
        let closed = self.socket.take().is_some();
        self.state = ProbeState::BeginProbe;
        self.remote = None;
        self.buffer.clear();
        self.offset = 0;
        closed
    }

    /// Advances the state machine with a completed I/O operation.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnexpectedEvent`] if a socket is delivered while
    /// a handshake is already in progress.
    pub fn on_io_complete(&mut self, event: ProbeEvent<S>) -> Result<ProbeStatus, ProbeError> {
        match (self.state, event) {
            (ProbeState::BeginProbe, ProbeEvent::Connected { socket, remote }) => {
                Ok(self.begin(socket, remote))
            }
            (ProbeState::BeginProbe, ProbeEvent::Transferred(_)) => {
                tracing::debug!(event = "probe.no_socket", "Probe started without a socket");
                Ok(self.fail())
            }
            (state, ProbeEvent::Connected { .. }) => Err(ProbeError::unexpected_event(
                state.as_str(),
                "connected",
            )),
            (state, ProbeEvent::Failed(error)) => {
                tracing::debug!(
                    event = "probe.socket_error",
                    remote = ?self.remote,
                    state = state.as_str(),
                    error = %error,
                    "No OPC UA server found"
                );
                Ok(self.fail())
            }
            (_, ProbeEvent::Transferred(0)) => {
                tracing::debug!(
                    event = "probe.connection_closed",
                    remote = ?self.remote,
                    state = self.state.as_str(),
                    "Peer closed the connection"
                );
                Ok(self.fail())
            }
            (ProbeState::SendHello, ProbeEvent::Transferred(n)) => Ok(self.on_sent(n)),
            (ProbeState::ReceiveSize, ProbeEvent::Transferred(n)) => Ok(self.on_header(n)),
            (ProbeState::ReceiveAck, ProbeEvent::Transferred(n)) => Ok(self.on_body(n)),
        }
    }

    fn pending(&self) -> ProbeStatus {
        ProbeStatus {
            done: false,
            ok: false,
            timeout: self.timeout,
        }
    }

    fn fail(&mut self) -> ProbeStatus {
        self.reset();
        ProbeStatus {
            done: true,
            ok: false,
            timeout: self.timeout,
        }
    }

    /// Advances the transfer cursor; returns `true` once the buffer is full.
    fn advance(&mut self, n: usize) -> bool {
        self.offset = (self.offset + n).min(self.buffer.len());
        self.offset == self.buffer.len()
    }

    fn expect(&mut self, state: ProbeState, len: usize) {
        self.state = state;
        self.buffer.clear();
        self.buffer.resize(len, 0);
        self.offset = 0;
    }

    fn begin(&mut self, socket: S, remote: SocketAddr) -> ProbeStatus {
        let hello = HelloMessage::new(format!("opc.tcp://{remote}")).encode();

        self.socket = Some(socket);
        self.remote = Some(remote);
        self.acknowledge = None;
        self.state = ProbeState::SendHello;
        self.buffer.clear();
        self.buffer.extend_from_slice(&hello);
        self.offset = 0;

        tracing::trace!(remote = %remote, bytes = hello.len(), "Sending Hello");
        self.pending()
    }

    fn on_sent(&mut self, n: usize) -> ProbeStatus {
        if !self.advance(n) {
            return self.pending();
        }
        self.expect(ProbeState::ReceiveSize, HEADER_SIZE);
        self.pending()
    }

    fn on_header(&mut self, n: usize) -> ProbeStatus {
        if !self.advance(n) {
            return self.pending();
        }

        let mut bytes = [0u8; HEADER_SIZE];
        bytes.copy_from_slice(&self.buffer[..HEADER_SIZE]);
        let header = MessageHeader::parse(&bytes);

        match header.message_type() {
            Some(MessageType::Acknowledge) => {}
            Some(other) => {
                tracing::debug!(
                    event = "probe.wrong_message_type",
                    remote = ?self.remote,
                    message_type = %other,
                    "Peer answered with a non-Acknowledge frame"
                );
                return self.fail();
            }
            None => {
                tracing::trace!(
                    event = "probe.invalid_message_type",
                    remote = ?self.remote,
                    tag = %header.tag_text(),
                    "Peer answered with an unknown frame type"
                );
                return self.fail();
            }
        }

        let length = header.length as usize;
        if length > DEFAULT_BUFFER_SIZE as usize {
            tracing::debug!(
                event = "probe.oversized_message",
                remote = ?self.remote,
                length,
                max = DEFAULT_BUFFER_SIZE,
                "Acknowledge exceeds receive buffer"
            );
            return self.fail();
        }
        if length < ACKNOWLEDGE_SIZE {
            tracing::debug!(
                event = "probe.undersized_message",
                remote = ?self.remote,
                length,
                min = ACKNOWLEDGE_SIZE,
                "Acknowledge too short"
            );
            return self.fail();
        }

        self.expect(ProbeState::ReceiveAck, length - HEADER_SIZE);
        self.pending()
    }

    fn on_body(&mut self, n: usize) -> ProbeStatus {
        if !self.advance(n) {
            return self.pending();
        }

        let ack = match AcknowledgeMessage::decode_body(&self.buffer) {
            Ok(ack) => ack,
            Err(error) => {
                tracing::debug!(
                    event = "probe.undersized_message",
                    remote = ?self.remote,
                    error = %error,
                    "Acknowledge body unreadable"
                );
                return self.fail();
            }
        };

        if ack.has_small_buffers() {
            tracing::warn!(
                event = "probe.small_buffer_size",
                remote = ?self.remote,
                receive_buffer_size = ack.receive_buffer_size,
                send_buffer_size = ack.send_buffer_size,
                min = MIN_BUFFER_SIZE,
                "Server advertises buffers below the protocol minimum"
            );
        }

        tracing::info!(
            event = "probe.server_found",
            remote = ?self.remote,
            protocol_version = ack.protocol_version,
            "Found OPC UA server"
        );

        self.reset();
        self.acknowledge = Some(ack);
        ProbeStatus {
            done: true,
            ok: true,
            timeout: self.timeout,
        }
    }
}

// =============================================================================
// Tokio driver
// =============================================================================

impl<S> ServerProbe<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Performs one partial send or receive of the pending operation.
    ///
    /// The returned event is meant to be fed to [`Self::on_io_complete`].
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] if nothing is pending or no socket is owned.
    pub async fn perform_io(&mut self) -> Result<ProbeEvent<S>, ProbeError> {
        let state = self.state.as_str();
        let pending = self.pending_io().ok_or(ProbeError::NothingPending { state })?;
        let socket = self.socket.as_mut().ok_or(ProbeError::NoSocket { state })?;

        let result = match pending {
            PendingIo::Send { .. } => socket.write(&self.buffer[self.offset..]).await,
            PendingIo::Receive { .. } => socket.read(&mut self.buffer[self.offset..]).await,
        };

        Ok(match result {
            Ok(n) => ProbeEvent::Transferred(n),
            Err(error) => ProbeEvent::Failed(error),
        })
    }

    /// Runs the handshake over an already connected socket.
    ///
    /// Every step is bounded by the probe timeout; on expiry the probe is
    /// reset and reports `false`.
    pub async fn run(&mut self, socket: S, remote: SocketAddr) -> bool {
        let mut event = ProbeEvent::Connected { socket, remote };
        loop {
            let status = match self.on_io_complete(event) {
                Ok(status) => status,
                Err(error) => {
                    OpcUaError::from(error).log("probe");
                    self.reset();
                    return false;
                }
            };
            if status.done {
                return status.ok;
            }

            event = match tokio::time::timeout(status.timeout, self.perform_io()).await {
                Ok(Ok(event)) => event,
                Ok(Err(error)) => {
                    OpcUaError::from(error).log("probe");
                    self.reset();
                    return false;
                }
                Err(_) => {
                    tracing::debug!(
                        event = "probe.timeout",
                        remote = %remote,
                        state = self.state.as_str(),
                        timeout_ms = status.timeout.as_millis() as u64,
                        "Probe step timed out"
                    );
                    self.reset();
                    return false;
                }
            };
        }
    }
}

impl ServerProbe<TcpStream> {
    /// Connects to `addr` and runs the handshake.
    ///
    /// Returns `true` if the peer is an OPC UA server.
    pub async fn probe(&mut self, addr: SocketAddr) -> bool {
        let connected = match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await
        {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
        };

        match connected {
            Ok(socket) => self.run(socket, addr).await,
            Err(error) => {
                self.remote = Some(addr);
                // Only the failure path of the transition is taken here.
                self.on_io_complete(ProbeEvent::Failed(error))
                    .map(|status| status.ok)
                    .unwrap_or(false)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
