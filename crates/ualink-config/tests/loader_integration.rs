// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Loader tests against files on disk.
//!
//! Each test that touches the environment uses its own variable prefix so the
//! tests can run in parallel.

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use ualink_config::{ConfigError, ConfigLoader, LogFormat, LogLevel};
use ualink_opcua::{NodeId, PortRange};

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn set_env(name: &str, value: &str) {
    // SAFETY: every test uses variable names no other test reads.
    unsafe { std::env::set_var(name, value) };
}

#[test]
fn test_load_yaml_file_with_type_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "types/extra.json",
        r#"{"types": [{"type_id": "ns=3;s=Mode", "alias": "Mode",
            "fields": [{"name": "Auto", "code": 1}, {"name": "Manual", "code": 2}]}]}"#,
    );
    write(
        dir.path(),
        "types/more.yaml",
        "types:\n  - type_id: \"i=852\"\n    fields:\n      - { name: Running, code: 0 }\n",
    );
    let config_path = write(
        dir.path(),
        "ualink.yaml",
        r#"
scanner:
  addresses: ["127.0.0.1"]
  ports: "4840-4841;50000"
codec:
  types:
    - type_id: "ns=2;i=3063"
      alias: MachineState
      fields:
        - { name: Idle, code: 0 }
        - { name: Running, code: 1 }
  type_files: ["types/extra.json", "types/more.yaml"]
"#,
    );

    let config = ConfigLoader::new()
        .with_env_prefix("UALINK_IT_TYPES")
        .load(&config_path)
        .unwrap();

    assert_eq!(config.codec.type_files[0], dir.path().join("types/extra.json"));
    assert_eq!(
        config.scanner.port_ranges().unwrap(),
        vec![PortRange::new(4840, 4841), PortRange::single(50000)]
    );

    let registry = config.codec.registry().unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.lookup("Mode").unwrap().fields().len(), 2);
    assert!(registry.get(&NodeId::numeric(0, 852)).is_some());
    assert!(registry.lookup("MachineState").is_some());
}

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "ualink.toml",
        r#"
[scanner]
ports = "*"
max_probes = 8
probe_timeout_ms = 750

[logging]
level = "warn"
format = "json"
"#,
    );

    let config = ConfigLoader::new()
        .with_env_prefix("UALINK_IT_TOML")
        .load(&path)
        .unwrap();
    assert_eq!(config.scanner.port_ranges().unwrap(), PortRange::all());
    assert_eq!(config.scanner.scanner_config().probe_timeout, Duration::from_millis(750));
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_placeholders_and_overrides() {
    set_env("UALINK_IT_PH_PORT", "4850");
    set_env("UALINK_IT_ENV_SCANNER_MAX_PROBES", "12");
    set_env("UALINK_IT_ENV_SCANNER_ADDRESSES", "10.0.0.1, 10.0.0.2");
    set_env("UALINK_IT_ENV_CODEC_REVERSIBLE", "no");
    set_env("UALINK_IT_ENV_LOG_LEVEL", "trace");

    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "ualink.json",
        r#"{"scanner": {"ports": "${UALINK_IT_PH_PORT};${UALINK_IT_PH_MISSING:4860}"}}"#,
    );

    let config = ConfigLoader::new()
        .with_env_prefix("UALINK_IT_ENV")
        .load(&path)
        .unwrap();
    assert_eq!(config.scanner.ports, "4850;4860");
    assert_eq!(config.scanner.max_probes, 12);
    assert_eq!(config.scanner.addresses, vec!["10.0.0.1", "10.0.0.2"]);
    assert!(!config.codec.reversible);
    assert_eq!(config.logging.level, LogLevel::Trace);

    let untouched = ConfigLoader::new()
        .with_env_prefix("UALINK_IT_ENV")
        .with_env_vars(false)
        .load(&path)
        .unwrap_err();
    assert!(matches!(untouched, ConfigError::Protocol(_)));
}

#[test]
fn test_invalid_override() {
    set_env("UALINK_IT_BAD_SCANNER_MAX_PROBES", "many");
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "ualink.yaml", "scanner:\n  max_probes: 4\n");

    let error = ConfigLoader::new()
        .with_env_prefix("UALINK_IT_BAD")
        .load(&path)
        .unwrap_err();
    assert!(matches!(error, ConfigError::InvalidEnvVar { ref name, .. }
        if name == "UALINK_IT_BAD_SCANNER_MAX_PROBES"));
}

#[test]
fn test_file_errors() {
    let dir = TempDir::new().unwrap();

    let error = ConfigLoader::new().load(dir.path().join("missing.yaml")).unwrap_err();
    assert!(error.is_io_error());

    let path = write(dir.path(), "ualink.ini", "[scanner]");
    let error = ConfigLoader::new().load(&path).unwrap_err();
    assert!(matches!(error, ConfigError::UnsupportedFormat { .. }));

    let path = write(dir.path(), "broken.json", "{\"scanner\": ");
    let error = ConfigLoader::new().load(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Parse { path: Some(_), .. }));
    assert!(error.to_string().contains("broken.json"));
}

#[test]
fn test_missing_type_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "ualink.yaml",
        "codec:\n  type_files: [\"nowhere.json\"]\n",
    );
    let config = ConfigLoader::new()
        .with_env_prefix("UALINK_IT_MISSING")
        .load(&path)
        .unwrap();
    assert!(config.codec.registry().unwrap_err().is_io_error());
}
