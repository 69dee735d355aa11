// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA endpoint discovery.
//!
//! - [`message`]: Hello/Acknowledge framing of the OPC UA TCP transport
//! - [`ServerProbe`]: per-endpoint handshake state machine
//! - [`PortRange`]: port range parsing and presets
//! - [`PortScanner`]: bounded concurrent sweeps

pub mod message;
mod port_range;
mod scanner;
mod server;

pub use port_range::PortRange;
pub use scanner::{
    probe_endpoint, resolve_host, PortScanner, ScanProgress, ScanReport, ScannerConfig,
    DEFAULT_MAX_PROBES,
};
pub use server::{
    PendingIo, ProbeEvent, ProbeState, ProbeStatus, ServerProbe, DEFAULT_PROBE_TIMEOUT,
};
