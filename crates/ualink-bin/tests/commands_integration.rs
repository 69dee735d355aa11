// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command tests against configuration files and loopback peers.

use std::fs;
use std::net::SocketAddr;

use clap::Parser;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use ualink_bin::cli::{Encoding, OutputFormat, ProbeArgs, ScanArgs};
use ualink_bin::commands::{self, decode_value, encode_value};
use ualink_bin::{BinError, Cli};
use ualink_opcua::probe::message::{AcknowledgeMessage, HEADER_SIZE};
use ualink_opcua::EnumValue;

const CONFIG: &str = r#"
scanner:
  ports: "4840"
  probe_timeout_ms: 1000
codec:
  reversible: false
  types:
    - type_id: "ns=2;i=3063"
      alias: MachineState
      fields:
        - { name: Idle, code: 0 }
        - { name: Running, code: 1 }
"#;

fn cli_for(dir: &TempDir, args: &[&str]) -> Cli {
    let path = dir.path().join("ualink.yaml");
    fs::write(&path, CONFIG).unwrap();
    let path = path.to_string_lossy().to_string();
    let mut argv = vec!["ualink", "-c", path.as_str()];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

/// Starts a peer that answers one Hello with an Acknowledge.
async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut header = [0u8; HEADER_SIZE];
            stream.read_exact(&mut header).await.unwrap();
            let length = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;
            let mut body = vec![0u8; length - HEADER_SIZE];
            stream.read_exact(&mut body).await.unwrap();
            stream
                .write_all(&AcknowledgeMessage::new(0).encode())
                .await
                .unwrap();
        }
    });
    addr
}

#[test]
fn test_codec_with_configured_types() {
    let dir = TempDir::new().unwrap();
    let cli = cli_for(&dir, &["version"]);
    let config = commands::load_config(&cli).unwrap();
    let registry = config.codec.registry().unwrap();
    let ty = registry.lookup("MachineState").unwrap();

    let encoding = Encoding::json(config.codec.reversible);
    assert_eq!(encoding, Encoding::JsonNr);
    assert_eq!(
        encode_value(&ty, "Value", Some("1"), encoding).unwrap(),
        r#"{"Value":"Running"}"#
    );

    let hex = encode_value(&ty, "Value", Some("Running"), Encoding::Binary).unwrap();
    assert_eq!(
        decode_value(&ty, "Value", &hex, Encoding::Binary).unwrap(),
        Some(EnumValue::new(Some("Running".to_string()), 1))
    );
}

#[test]
fn test_codec_commands_run() {
    let dir = TempDir::new().unwrap();
    let cli = cli_for(&dir, &["encode", "-t", "MachineState", "--value", "Idle"]);
    let config = commands::load_config(&cli).unwrap();
    let ualink_bin::Commands::Encode(args) = cli.command.clone() else {
        panic!("Expected Encode command");
    };
    commands::encode(&config, args).unwrap();

    let cli = cli_for(&dir, &["decode", "-t", "Nope", "1"]);
    let ualink_bin::Commands::Decode(args) = cli.command.clone() else {
        panic!("Expected Decode command");
    };
    assert!(matches!(commands::decode(&config, args), Err(BinError::Configuration(_))));
}

#[test]
fn test_validate_command() {
    let dir = TempDir::new().unwrap();
    let cli = cli_for(&dir, &["validate", "-f", "json", "--show-config"]);
    let config = commands::load_config(&cli).unwrap();
    let ualink_bin::Commands::Validate(args) = cli.command.clone() else {
        panic!("Expected Validate command");
    };
    commands::validate(&cli, &config, args).unwrap();
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "scanner:\n  max_probes: 0\n").unwrap();
    let cli = Cli::parse_from(["ualink", "-c", path.to_str().unwrap(), "validate"]);
    let error = commands::load_config(&cli).unwrap_err();
    assert_eq!(error.exit_code(), 1);
}

#[tokio::test]
async fn test_probe_command() {
    let dir = TempDir::new().unwrap();
    let cli = cli_for(&dir, &["version"]);
    let config = commands::load_config(&cli).unwrap();

    let addr = spawn_server().await;
    let args = ProbeArgs {
        endpoint: format!("opc.tcp://{addr}/"),
        timeout_ms: None,
        format: OutputFormat::Json,
    };
    commands::probe(&config, args).await.unwrap();

    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let args = ProbeArgs {
        endpoint: closed.to_string(),
        timeout_ms: Some(500),
        format: OutputFormat::Text,
    };
    let error = commands::probe(&config, args).await.unwrap_err();
    assert!(matches!(error, BinError::NotFound(_)));
    assert_eq!(error.exit_code(), 5);
}

#[tokio::test]
async fn test_scan_command() {
    let dir = TempDir::new().unwrap();
    let cli = cli_for(&dir, &["version"]);
    let config = commands::load_config(&cli).unwrap();

    let addr = spawn_server().await;
    let args = ScanArgs {
        addresses: vec![addr.ip().to_string()],
        ports: Some(addr.port().to_string()),
        preset: None,
        max_probes: Some(4),
        timeout_ms: Some(1000),
        format: OutputFormat::Json,
    };
    commands::scan(&config, args).await.unwrap();
}
