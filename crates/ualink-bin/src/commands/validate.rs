// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use ualink_config::UalinkConfig;
use ualink_opcua::PortRange;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command.
///
/// The configuration has already been loaded and validated; this also loads
/// every type file and reports the result.
pub fn validate(cli: &Cli, config: &UalinkConfig, args: ValidateArgs) -> BinResult<()> {
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    let ranges = config.scanner.port_ranges()?;
    let registry = config
        .codec
        .registry()
        .map_err(|e| BinError::from(e).with_context("Loading type descriptions"))?;

    let mut warnings: Vec<String> = Vec::new();
    if config.scanner.addresses.is_empty() {
        warnings.push("scanner.addresses is empty; scan needs addresses on the command line".to_string());
    }
    if PortRange::total(&ranges) > 10_000 {
        warnings.push(format!(
            "scanner.ports covers {} ports per address",
            PortRange::total(&ranges)
        ));
    }
    let mut empty_types: Vec<String> = registry
        .type_ids()
        .into_iter()
        .filter_map(|id| registry.get(&id))
        .filter(|d| d.is_empty())
        .map(|d| d.display_name())
        .collect();
    empty_types.sort();
    for name in empty_types {
        warnings.push(format!("Type {name} declares no fields"));
    }

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {source}");
            println!();
            println!("Summary:");
            println!("  Addresses:   {}", config.scanner.addresses.len());
            println!("  Ports:       {}", PortRange::format(&ranges));
            println!("  Max probes:  {}", config.scanner.max_probes);
            println!("  Timeout:     {} ms", config.scanner.probe_timeout_ms);
            println!("  Types:       {}", registry.len());
            println!(
                "  JSON:        {}",
                if config.codec.reversible { "reversible" } else { "non-reversible" }
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {warning}");
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                let text = serde_json::to_string_pretty(config)
                    .unwrap_or_else(|_| "(serialization error)".to_string());
                println!("{text}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "address_count": config.scanner.addresses.len(),
                    "ports": PortRange::format(&ranges),
                    "max_probes": config.scanner.max_probes,
                    "probe_timeout_ms": config.scanner.probe_timeout_ms,
                    "type_count": registry.len(),
                    "reversible": config.codec.reversible,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(config) } else { None },
            });
            println!("{output:#}");
        }
    }

    Ok(())
}
