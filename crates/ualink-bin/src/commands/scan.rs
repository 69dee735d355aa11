// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `scan` command.

use std::net::IpAddr;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};
use ualink_config::UalinkConfig;
use ualink_opcua::probe::resolve_host;
use ualink_opcua::{PortRange, PortScanner};

use crate::cli::{OutputFormat, ScanArgs};
use crate::error::{BinError, BinResult};

/// Executes the `scan` command.
///
/// Found endpoints are printed as they are discovered in text mode. Ctrl-C
/// aborts the outstanding probes.
pub async fn scan(config: &UalinkConfig, args: ScanArgs) -> BinResult<()> {
    let hosts = if args.addresses.is_empty() {
        config.scanner.addresses.clone()
    } else {
        args.addresses.clone()
    };
    if hosts.is_empty() {
        return Err(BinError::config(
            "No addresses given and scanner.addresses is empty",
        ));
    }

    let ranges = match (&args.ports, args.preset) {
        (Some(ports), _) => PortRange::parse(ports).map_err(ualink_opcua::OpcUaError::from)?,
        (None, Some(preset)) => preset.ranges(),
        (None, None) => config.scanner.port_ranges()?,
    };
    if ranges.is_empty() {
        return Err(BinError::config("No ports to scan"));
    }

    let mut scanner_config = config.scanner.scanner_config();
    if let Some(max_probes) = args.max_probes {
        scanner_config = scanner_config.with_max_probes(max_probes);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        scanner_config = scanner_config.with_probe_timeout(Duration::from_millis(timeout_ms));
    }
    scanner_config
        .validate()
        .map_err(ualink_opcua::OpcUaError::from)?;

    let addresses = resolve_all(&hosts).await?;
    info!(
        addresses = addresses.len(),
        ports = %PortRange::format(&ranges),
        endpoints = addresses.len() as u64 * PortRange::total(&ranges),
        "Scanning"
    );

    let format = args.format;
    let (sender, mut receiver) = mpsc::channel(64);
    let printer = tokio::spawn(async move {
        while let Some(endpoint) = receiver.recv().await {
            if format == OutputFormat::Text {
                println!("✓ opc.tcp://{endpoint}");
            }
        }
    });

    let scanner = PortScanner::new(scanner_config).with_notifier(sender);
    let report = tokio::select! {
        report = scanner.scan(&addresses, &ranges) => report,
        _ = tokio::signal::ctrl_c() => {
            warn!("Scan interrupted");
            return Err(BinError::runtime("Scan interrupted"));
        }
    };
    drop(scanner);
    if let Err(e) = printer.await {
        warn!(error = %e, "Output task failed");
    }

    match format {
        OutputFormat::Text => {
            println!();
            println!(
                "Scanned {} endpoints in {} ms: {} server(s), {} without answer",
                report.scanned,
                report.elapsed().num_milliseconds(),
                report.found.len(),
                report.failed
            );
        }
        OutputFormat::Json => {
            let output = serde_json::to_string_pretty(&report)
                .map_err(|e| BinError::runtime(format!("Failed to serialize report: {e}")))?;
            println!("{output}");
        }
    }
    Ok(())
}

async fn resolve_all(hosts: &[String]) -> BinResult<Vec<IpAddr>> {
    let mut addresses = Vec::new();
    for host in hosts {
        for address in resolve_host(host.trim()).await? {
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }
    }
    Ok(addresses)
}
