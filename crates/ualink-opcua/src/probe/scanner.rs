// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Concurrent endpoint sweeps.
//!
//! [`PortScanner`] runs one [`ServerProbe`] per candidate endpoint, bounded
//! by a semaphore shared by every scan on the same scanner. Dropping a scan
//! future aborts the probes it started.
//!
//! # Examples
//!
//! ```no_run
//! use ualink_opcua::probe::{PortRange, PortScanner, ScannerConfig};
//!
//! # async fn example() {
//! let scanner = PortScanner::new(ScannerConfig::default());
//! let addresses: [std::net::IpAddr; 1] = ["127.0.0.1".parse().unwrap()];
//! let report = scanner.scan(&addresses, &PortRange::opc_ua()).await;
//! for endpoint in &report.found {
//!     println!("OPC UA server at {endpoint}");
//! }
//! # }
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use super::port_range::PortRange;
use super::server::{ServerProbe, DEFAULT_PROBE_TIMEOUT};
use crate::error::{ConfigurationError, ConnectionError, OpcUaError, OpcUaResult};

/// Default number of probes running at once.
pub const DEFAULT_MAX_PROBES: usize = 100;

/// Probes `addr` once and returns `true` if it is an OPC UA server.
pub async fn probe_endpoint(addr: SocketAddr, timeout: Duration) -> bool {
    let mut probe: ServerProbe = ServerProbe::new(timeout);
    probe.probe(addr).await
}

/// Resolves a host name or address literal to IP addresses.
pub async fn resolve_host(host: &str) -> OpcUaResult<Vec<IpAddr>> {
    if let Ok(address) = host.parse::<IpAddr>() {
        return Ok(vec![address]);
    }

    let resolved = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ConnectionError::dns_failed(host, Some(e)))?;

    let mut addresses: Vec<IpAddr> = resolved.map(|a| a.ip()).collect();
    addresses.dedup();
    if addresses.is_empty() {
        return Err(ConnectionError::dns_failed(host, None).into());
    }
    Ok(addresses)
}

// =============================================================================
// ScannerConfig
// =============================================================================

/// Scanner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Largest number of probes running at once.
    pub max_probes: usize,
    /// Timeout of each probe I/O step.
    pub probe_timeout: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_probes: DEFAULT_MAX_PROBES,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ScannerConfig {
    /// Sets the concurrency bound.
    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes;
        self
    }

    /// Sets the per-step probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_probes == 0 {
            return Err(ConfigurationError::invalid_setting(
                "max_probes",
                "At least one probe must be allowed",
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigurationError::invalid_timeout(
                self.probe_timeout,
                "Probe timeout must be positive",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Live counters of the scans on one scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    /// Probes currently running.
    pub active: usize,
    /// Endpoints probed to completion.
    pub scanned: usize,
    /// Endpoints that completed the handshake.
    pub found: usize,
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Endpoints that completed the handshake, sorted.
    pub found: Vec<SocketAddr>,
    /// Endpoints probed.
    pub scanned: usize,
    /// Endpoints that did not answer as OPC UA servers.
    pub failed: usize,
    /// Scan start.
    pub started_at: DateTime<Utc>,
    /// Scan end.
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    /// Returns the wall-clock duration of the scan.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Counts one running probe in [`ScanProgress`] until dropped.
///
/// Aborted probe tasks drop their guard too, so `active` never leaks.
struct ActiveProbe {
    progress: Arc<Mutex<ScanProgress>>,
    finished: bool,
}

impl ActiveProbe {
    fn start(progress: Arc<Mutex<ScanProgress>>) -> Self {
        progress.lock().active += 1;
        Self {
            progress,
            finished: false,
        }
    }

    fn finish(&mut self, found: bool) {
        let mut progress = self.progress.lock();
        progress.active -= 1;
        progress.scanned += 1;
        progress.found += usize::from(found);
        self.finished = true;
    }
}

impl Drop for ActiveProbe {
    fn drop(&mut self) {
        if !self.finished {
            self.progress.lock().active -= 1;
        }
    }
}

// =============================================================================
// PortScanner
// =============================================================================

/// Sweeps addresses and port ranges for OPC UA servers.
#[derive(Debug)]
pub struct PortScanner {
    config: ScannerConfig,
    permits: Arc<Semaphore>,
    progress: Arc<Mutex<ScanProgress>>,
    notifier: Option<mpsc::Sender<SocketAddr>>,
}

impl PortScanner {
    /// Creates a scanner.
    ///
    /// A `max_probes` of zero is raised to one.
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.max_probes.max(1))),
            config,
            progress: Arc::new(Mutex::new(ScanProgress::default())),
            notifier: None,
        }
    }

    /// Streams every found endpoint to `sender` as it is discovered.
    pub fn with_notifier(mut self, sender: mpsc::Sender<SocketAddr>) -> Self {
        self.notifier = Some(sender);
        self
    }

    /// Returns the scanner settings.
    #[inline]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Returns a snapshot of the live counters.
    pub fn progress(&self) -> ScanProgress {
        *self.progress.lock()
    }

    /// Probes every port of `ranges` on every address.
    pub async fn scan(&self, addresses: &[IpAddr], ranges: &[PortRange]) -> ScanReport {
        let endpoints = addresses
            .iter()
            .flat_map(|&address| ranges.iter().flat_map(move |r| r.endpoints(address)));
        self.scan_endpoints(endpoints).await
    }

    /// Probes the given endpoints.
    pub async fn scan_endpoints(
        &self,
        endpoints: impl IntoIterator<Item = SocketAddr>,
    ) -> ScanReport {
        let started_at = Utc::now();
        let mut tasks = JoinSet::new();
        let mut report = ScanReport {
            found: Vec::new(),
            scanned: 0,
            failed: 0,
            started_at,
            finished_at: started_at,
        };

        tracing::info!(
            max_probes = self.config.max_probes,
            timeout_ms = self.config.probe_timeout.as_millis() as u64,
            "Starting endpoint scan"
        );

        for endpoint in endpoints {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let timeout = self.config.probe_timeout;
            let mut guard = ActiveProbe::start(Arc::clone(&self.progress));
            tasks.spawn(async move {
                let ok = probe_endpoint(endpoint, timeout).await;
                drop(permit);
                guard.finish(ok);
                (endpoint, ok)
            });

            while let Some(result) = tasks.try_join_next() {
                self.record(&mut report, result).await;
            }
        }

        while let Some(result) = tasks.join_next().await {
            self.record(&mut report, result).await;
        }

        report.found.sort();
        report.finished_at = Utc::now();

        tracing::info!(
            scanned = report.scanned,
            found = report.found.len(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Endpoint scan finished"
        );
        report
    }

    async fn record(
        &self,
        report: &mut ScanReport,
        result: Result<(SocketAddr, bool), tokio::task::JoinError>,
    ) {
        report.scanned += 1;
        match result {
            Ok((endpoint, true)) => {
                tracing::debug!(endpoint = %endpoint, "Endpoint is an OPC UA server");
                report.found.push(endpoint);
                if let Some(sender) = &self.notifier {
                    // A dropped receiver only stops streaming.
                    let _ = sender.send(endpoint).await;
                }
            }
            Ok((_, false)) => report.failed += 1,
            Err(error) => {
                OpcUaError::connection(ConnectionError::io(
                    "probe task failed",
                    std::io::Error::other(error.to_string()),
                ))
                .log("scan");
                report.failed += 1;
            }
        }
    }
}
