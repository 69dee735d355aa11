// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `probe` command.

use std::net::SocketAddr;
use std::time::Duration;

use ualink_config::UalinkConfig;
use ualink_opcua::probe::resolve_host;
use ualink_opcua::ServerProbe;

use crate::cli::{OutputFormat, ProbeArgs};
use crate::error::{BinError, BinResult};

/// Port used when an endpoint names none.
pub const DEFAULT_PORT: u16 = 4840;

/// Splits `host`, `host:port`, `[v6]:port` or `opc.tcp://host:port/path`
/// into host and port.
pub fn parse_endpoint(endpoint: &str) -> BinResult<(String, u16)> {
    let text = endpoint.trim();
    let text = text.strip_prefix("opc.tcp://").unwrap_or(text);
    let authority = text.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(BinError::config(format!("No host in endpoint '{endpoint}'")));
    }

    if let Ok(addr) = authority.parse::<SocketAddr>() {
        return Ok((addr.ip().to_string(), addr.port()));
    }

    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| BinError::config(format!("Unclosed bracket in '{endpoint}'")))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(port, endpoint)?,
            None if tail.is_empty() => DEFAULT_PORT,
            None => return Err(BinError::config(format!("Bad endpoint '{endpoint}'"))),
        };
        return Ok((host.to_string(), port));
    }

    match authority.split_once(':') {
        // A second colon without brackets is a bare IPv6 address.
        Some((_, rest)) if rest.contains(':') => Ok((authority.to_string(), DEFAULT_PORT)),
        Some((host, port)) => Ok((host.to_string(), parse_port(port, endpoint)?)),
        None => Ok((authority.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(text: &str, endpoint: &str) -> BinResult<u16> {
    text.parse()
        .map_err(|_| BinError::config(format!("Bad port '{text}' in '{endpoint}'")))
}

/// Executes the `probe` command.
///
/// Every address the host resolves to is tried in turn until one answers.
pub async fn probe(config: &UalinkConfig, args: ProbeArgs) -> BinResult<()> {
    let (host, port) = parse_endpoint(&args.endpoint)?;
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.scanner.probe_timeout());
    if timeout.is_zero() {
        return Err(BinError::config("Probe timeout must be positive"));
    }

    let addresses = resolve_host(&host).await?;
    let mut probe: ServerProbe = ServerProbe::new(timeout);

    for address in addresses {
        let endpoint = SocketAddr::new(address, port);
        if !probe.probe(endpoint).await {
            continue;
        }

        let ack = probe.acknowledge().copied();
        match args.format {
            OutputFormat::Text => {
                println!("✓ opc.tcp://{endpoint} is an OPC UA server");
                if let Some(ack) = ack {
                    println!("  Protocol version:    {}", ack.protocol_version);
                    println!("  Receive buffer size: {}", ack.receive_buffer_size);
                    println!("  Send buffer size:    {}", ack.send_buffer_size);
                    println!("  Max message size:    {}", ack.max_message_size);
                    println!("  Max chunk count:     {}", ack.max_chunk_count);
                }
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "endpoint": endpoint.to_string(),
                    "server": true,
                    "acknowledge": ack.map(|ack| serde_json::json!({
                        "protocol_version": ack.protocol_version,
                        "receive_buffer_size": ack.receive_buffer_size,
                        "send_buffer_size": ack.send_buffer_size,
                        "max_message_size": ack.max_message_size,
                        "max_chunk_count": ack.max_chunk_count,
                    })),
                });
                println!("{output:#}");
            }
        }
        return Ok(());
    }

    if args.format == OutputFormat::Json {
        let output = serde_json::json!({
            "endpoint": format!("{host}:{port}"),
            "server": false,
        });
        println!("{output:#}");
    }
    Err(BinError::not_found(format!(
        "No OPC UA server at {host}:{port}"
    )))
}
